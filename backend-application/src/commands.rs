// Write-side use cases
pub mod container_commands;
pub mod import_commands;
pub mod price_commands;
