// Raw marketplace inventory export
// Three parallel collections joined by asset id and (classid, instanceid)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub assets: Vec<RawAsset>,
    #[serde(default)]
    pub descriptions: Vec<RawDescription>,
    #[serde(default)]
    pub asset_properties: Vec<RawAssetProperties>,
}

impl RawSnapshot {
    /// Parses one export. Blank input is an empty snapshot, not a syntax error.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAsset {
    #[serde(deserialize_with = "string_or_number")]
    pub assetid: String,
    #[serde(deserialize_with = "string_or_number")]
    pub classid: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub instanceid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDescription {
    #[serde(deserialize_with = "string_or_number")]
    pub classid: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub instanceid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market_hash_name: String,
    #[serde(default)]
    pub tags: Vec<RawTag>,
    #[serde(default)]
    pub descriptions: Vec<RawDescriptionLine>,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

impl RawDescription {
    pub fn key(&self) -> (String, String) {
        (self.classid.clone(), self.instanceid.clone())
    }

    pub fn tag(&self, category: &str) -> Option<&RawTag> {
        self.tags.iter().find(|tag| tag.category == category)
    }

    pub fn line(&self, name: &str) -> Option<&RawDescriptionLine> {
        self.descriptions.iter().find(|line| line.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTag {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub internal_name: String,
    #[serde(default)]
    pub localized_tag_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDescriptionLine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAssetProperties {
    #[serde(deserialize_with = "string_or_number")]
    pub assetid: String,
    #[serde(default)]
    pub asset_properties: Vec<RawProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProperty {
    pub propertyid: u32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub float_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub int_value: Option<i64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    })
}
