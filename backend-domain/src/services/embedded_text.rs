//! Scraping rules for the HTML-like text blobs embedded in item descriptions.
//!
//! The marketplace renders stickers, charms, name tags and container attributes as
//! display text. Every rule that depends on that format lives here so it can be
//! tested on its own and replaced when the upstream text changes.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::entities::{Keychain, Sticker};
use crate::value_objects::StickerKind;

pub const STICKER_INFO_LINE: &str = "sticker_info";
pub const KEYCHAIN_INFO_LINE: &str = "keychain_info";
pub const NAME_TAG_LINE: &str = "nametag";
pub const ITEMS_COUNT_LINE: &str = "attr: items count";
pub const MODIFICATION_DATE_LINE: &str = "attr: modification date";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"title="([^"]*)"|title='([^']*)'"#).unwrap());
static PREFIXED_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(Sticker|Patch)\s*:\s*(.+?)\s*$").unwrap());
static CHARM_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Charm\s*:\s*").unwrap());
static NAME_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Name Tag:\s*(?:''(.+?)''|"(.+?)"|'(.+?)')"#).unwrap()
});
static NAME_TAG_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Name Tag\s*:\s*").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static FIRST_INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());
static MODIFICATION_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Modification Date:\s*(.+?)\s*GMT").unwrap());
static STATTRAK_KILLS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)StatTrak(?:™)?\s+Confirmed\s+Kills:\s*(\d+)").unwrap());

const MODIFICATION_DATE_FORMATS: [&str; 3] =
    ["%b %d, %Y (%H:%M:%S)", "%B %d, %Y (%H:%M:%S)", "%Y-%m-%d %H:%M:%S"];

/// First non-empty capture group of `pattern` in `text`.
pub fn parse_embedded_attribute(text: &str, pattern: &Regex) -> Option<String> {
    let captures = pattern.captures(text)?;
    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|group| group.as_str().trim())
        .find(|value| !value.is_empty())
        .map(ToString::to_string)
}

pub fn strip_tags(text: &str) -> String {
    TAG_RE
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stickers and patches share one blob; each title carries its kind as a prefix.
pub fn parse_stickers(html: &str) -> Vec<Sticker> {
    let titles = TITLE_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|group| group.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
        .collect::<Vec<_>>();

    titles
        .iter()
        .enumerate()
        .map(|(slot, title)| {
            let (kind, name) = match PREFIXED_TITLE_RE.captures(title) {
                Some(caps) => (
                    StickerKind::from(&caps[1]),
                    caps[2].trim().to_string(),
                ),
                None => (StickerKind::Sticker, title.clone()),
            };
            Sticker {
                name,
                kind,
                slot: u8::try_from(slot).unwrap_or(u8::MAX),
                wear: None,
            }
        })
        .collect()
}

pub fn parse_keychain(html: &str) -> Option<Keychain> {
    let raw = parse_embedded_attribute(html, &TITLE_RE).or_else(|| {
        let text = strip_tags(html);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })?;
    let name = CHARM_PREFIX_RE.replace(&raw, "").trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some(Keychain {
        name,
        pattern: None,
    })
}

/// Quoted text after a `Name Tag:` label, falling back to the tag-stripped text
/// with the label and surrounding quote characters removed.
pub fn parse_name_tag(text: &str) -> Option<String> {
    if let Some(value) = parse_embedded_attribute(text, &NAME_TAG_RE) {
        return Some(value);
    }
    let stripped = strip_tags(text);
    let unlabeled = NAME_TAG_LABEL_RE.replace(&stripped, "");
    let value = unlabeled
        .trim()
        .trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace());
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_first_integer(text: &str) -> Option<u32> {
    parse_embedded_attribute(text, &FIRST_INTEGER_RE).and_then(|value| value.parse().ok())
}

pub fn parse_stattrak_kills(text: &str) -> Option<i64> {
    parse_embedded_attribute(text, &STATTRAK_KILLS_RE).and_then(|value| value.parse().ok())
}

/// `Modification Date: <text> GMT`. `Err` carries the unparseable text.
pub fn parse_modification_date(text: &str) -> Result<Option<DateTime<Utc>>, String> {
    let Some(raw) = parse_embedded_attribute(text, &MODIFICATION_DATE_RE) else {
        return Ok(None);
    };
    MODIFICATION_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or(raw)
}
