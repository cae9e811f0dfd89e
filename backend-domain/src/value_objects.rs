// Domain value objects
pub mod identifiers;
pub mod item_type;
pub mod selection_key;
pub mod sticker_kind;

pub use identifiers::*;
pub use item_type::*;
pub use selection_key::*;
pub use sticker_kind::*;
