// Read-side use cases
pub mod inventory_queries;
pub mod price_queries;
