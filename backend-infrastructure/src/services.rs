pub mod health_service;
pub mod session_store;

pub use health_service::*;
pub use session_store::*;
