// Domain services
pub mod catalog_matcher;
pub mod container_extractor;
pub mod diff_engine;
pub mod embedded_text;
pub mod snapshot_parser;
pub mod valuation;

pub use catalog_matcher::*;
pub use container_extractor::*;
pub use diff_engine::*;
pub use snapshot_parser::*;
pub use valuation::*;
