pub mod container_handlers;
pub mod import_handlers;
pub mod inventory_handlers;
pub mod ops_handlers;
pub mod price_handlers;

pub use container_handlers::*;
pub use import_handlers::*;
pub use inventory_handlers::*;
pub use ops_handlers::*;
pub use price_handlers::*;
