pub mod catalog_seed;
pub mod clickhouse_prices;
pub mod sqlite_inventory;

pub use catalog_seed::*;
pub use clickhouse_prices::*;
pub use sqlite_inventory::*;
