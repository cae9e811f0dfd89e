// Backend Application Layer

pub mod commands;
pub mod enrichment;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod staging;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use staging::StagedTransactionStore;
pub use state::AppState;
