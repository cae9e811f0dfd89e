// Sticker kind value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StickerKind {
    Sticker,
    Patch,
}

impl StickerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StickerKind::Sticker => "Sticker",
            StickerKind::Patch => "Patch",
        }
    }
}

impl From<&str> for StickerKind {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "patch" => StickerKind::Patch,
            _ => StickerKind::Sticker,
        }
    }
}
