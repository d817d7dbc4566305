use crate::de::{null_as_default, string_or_number};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Every pollen API response wraps its payload in `{"data": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// One pollen type as reported by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollenRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub translation_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub threshold: Vec<Threshold>,
    #[serde(default)]
    pub last_measurement_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pictures: Vec<Picture>,
    /// Translation keys, the first one is shown as the sensor description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub key: String,
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub locale: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Looks `key` up in `domain` and returns its text in `language`.
///
/// Falls back to `key` itself when the entry, the locale, or its content is
/// missing.
pub fn translate(entries: &[TranslationEntry], key: &str, domain: &str, language: &str) -> String {
    entries
        .iter()
        .find(|e| e.key == key && e.domain == domain)
        .and_then(|e| e.translations.iter().find(|t| t.locale == language))
        .and_then(|t| t.content.clone())
        .unwrap_or_else(|| key.to_string())
}

/// What a coordinator knows after its most recent refreshes.
#[derive(Debug, Clone, Default)]
pub struct PollenState {
    pub pollen: Option<Vec<PollenRecord>>,
    pub translations: Option<Vec<TranslationEntry>>,
    pub last_poll: Option<DateTime<Local>>,
    pub next_poll: Option<DateTime<Local>>,
}

impl PollenState {
    /// The active record for `translation_key`, if any.
    pub fn active_record(&self, translation_key: &str) -> Option<&PollenRecord> {
        self.pollen
            .as_deref()?
            .iter()
            .find(|p| p.translation_key == translation_key && p.active)
    }

    /// True once both pollen data and translations are present.
    pub fn is_ready(&self) -> bool {
        self.pollen.is_some() && self.translations.is_some()
    }

    pub fn translations(&self) -> &[TranslationEntry] {
        self.translations.as_deref().unwrap_or_default()
    }
}
