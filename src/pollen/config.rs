use bon::Builder;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_NAME: &str = "Pollen Lu";
pub const DEFAULT_BASE_URL: &str = "https://pollen-api.chl.lu/api";
pub const DEFAULT_LANGUAGE: &str = "en";
/// Minutes between polls.
pub const DEFAULT_SCAN_INTERVAL: u64 = 60;
/// Longest accepted interval, one week in minutes.
pub const MAX_SCAN_INTERVAL: u64 = 7 * 24 * 60;

/// Settings of one pollen integration entry.
///
/// ```
/// use lu_environment::pollen::PollenConfig;
///
/// let config = PollenConfig::builder().scan_interval(30).language("lb").build();
/// assert_eq!(config.name, "Pollen Lu");
/// assert_eq!(config.pollens_url(), "https://pollen-api.chl.lu/api/pollens");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct PollenConfig {
    #[serde(default = "default_name")]
    #[builder(default = DEFAULT_NAME.to_string())]
    pub name: String,

    /// Minutes between polls.
    #[serde(default = "default_scan_interval")]
    #[builder(default = DEFAULT_SCAN_INTERVAL)]
    pub scan_interval: u64,

    #[serde(default = "default_base_url")]
    #[builder(default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    /// Locale used to translate sensor names and descriptions.
    #[serde(default = "default_language")]
    #[builder(default = DEFAULT_LANGUAGE.to_string())]
    pub language: String,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for PollenConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PollenConfig {
    pub fn translations_url(&self) -> String {
        format!("{}/translations", self.base_url.trim_end_matches('/'))
    }

    pub fn pollens_url(&self) -> String {
        format!("{}/pollens", self.base_url.trim_end_matches('/'))
    }

    /// The poll period. A zero interval is raised to one minute and
    /// anything above [`MAX_SCAN_INTERVAL`] is capped.
    pub fn poll_period(&self) -> Duration {
        let minutes = match self.scan_interval {
            0 => {
                warn!("Scan interval of 0 minutes for '{}', using 1 minute", self.name);
                1
            }
            m if m > MAX_SCAN_INTERVAL => {
                warn!(
                    "Scan interval of {} minutes for '{}', using {}",
                    m, self.name, MAX_SCAN_INTERVAL
                );
                MAX_SCAN_INTERVAL
            }
            m => m,
        };
        Duration::from_secs(minutes * 60)
    }
}

/// Values changed after the entry was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default)]
    pub scan_interval: Option<u64>,
}

/// A configured integration entry as the host stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    #[serde(default)]
    pub data: PollenConfig,
    #[serde(default)]
    pub options: EntryOptions,
}

impl ConfigEntry {
    pub fn new(entry_id: impl Into<String>, data: PollenConfig) -> Self {
        Self {
            entry_id: entry_id.into(),
            data,
            options: EntryOptions::default(),
        }
    }

    /// Options take precedence over the creation-time data.
    pub fn effective_scan_interval(&self) -> u64 {
        self.options.scan_interval.unwrap_or(self.data.scan_interval)
    }

    /// The creation-time config with the effective scan interval applied.
    pub fn effective_config(&self) -> PollenConfig {
        PollenConfig {
            scan_interval: self.effective_scan_interval(),
            ..self.data.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PollenConfig::default();
        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.scan_interval, 60);
        assert_eq!(config.poll_period(), Duration::from_secs(3600));
        assert_eq!(config.translations_url(), "https://pollen-api.chl.lu/api/translations");
    }

    #[test]
    fn test_deserialize_partial() {
        let entry: ConfigEntry =
            serde_json::from_str(r#"{"entry_id": "abc", "data": {"scan_interval": 15}}"#).unwrap();
        assert_eq!(entry.data.scan_interval, 15);
        assert_eq!(entry.data.language, "en");
        assert_eq!(entry.options.scan_interval, None);
        assert_eq!(entry.effective_scan_interval(), 15);
    }

    #[test]
    fn test_options_override_data() {
        let mut entry = ConfigEntry::new("abc", PollenConfig::builder().scan_interval(15).build());
        entry.options.scan_interval = Some(120);
        assert_eq!(entry.effective_scan_interval(), 120);
        assert_eq!(entry.effective_config().scan_interval, 120);
        assert_eq!(entry.effective_config().name, DEFAULT_NAME);
    }

    #[test]
    fn test_missing_data_uses_default_interval() {
        let entry: ConfigEntry = serde_json::from_str(r#"{"entry_id": "abc"}"#).unwrap();
        assert_eq!(entry.effective_scan_interval(), DEFAULT_SCAN_INTERVAL);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = PollenConfig::builder().scan_interval(0).build();
        assert_eq!(config.poll_period(), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let config = PollenConfig::builder().scan_interval(u64::MAX).build();
        assert_eq!(config.poll_period(), Duration::from_secs(MAX_SCAN_INTERVAL * 60));
        assert!(tokio::time::Instant::now()
            .checked_add(config.poll_period())
            .is_some());

        let week = PollenConfig::builder().scan_interval(MAX_SCAN_INTERVAL).build();
        assert_eq!(week.poll_period(), Duration::from_secs(7 * 24 * 3600));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = PollenConfig::builder().base_url("http://localhost/api/").build();
        assert_eq!(config.pollens_url(), "http://localhost/api/pollens");
    }
}
