// Domain entities

pub mod catalog;
pub mod container;
pub mod diff;
pub mod inventory;
pub mod model;
pub mod normalized;
pub mod price;
pub mod snapshot;

pub use catalog::*;
pub use container::*;
pub use diff::*;
pub use inventory::*;
pub use model::*;
pub use normalized::*;
pub use price::*;
pub use snapshot::*;
