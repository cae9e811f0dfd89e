// Item type value object, from the description's `Type` tag

pub const TYPE_TAG_CATEGORY: &str = "Type";
pub const QUALITY_TAG_CATEGORY: &str = "Quality";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    Collectible,
    Spray,
    Tool,
    Other(String),
    Unknown,
}

impl From<&str> for ItemType {
    fn from(s: &str) -> Self {
        match s {
            "" => ItemType::Unknown,
            "CSGO_Type_Collectible" => ItemType::Collectible,
            "CSGO_Type_Spray" => ItemType::Spray,
            "CSGO_Type_Tool" => ItemType::Tool,
            other => ItemType::Other(other.to_string()),
        }
    }
}
