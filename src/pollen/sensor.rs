//! Renders coordinator state as host-facing sensor entities.

use crate::pollen::types::{translate, PollenRecord, PollenState, Threshold};
use chrono::{DateTime, Local};
use serde::Serialize;

pub const UNIT: &str = "p/m³";
pub const ICON: &str = "mdi:flower-pollen";
const TRANSLATION_DOMAIN: &str = "pollen";
const LEVEL_UNDETECTED: &str = "undetected";
const MISSING_THRESHOLD: f64 = 999.0;
/// State reported when no active record exists for the sensor.
pub const STATE_UNAVAILABLE: i64 = -1;

/// One sensor entity, bound to a pollen type by its translation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollenSensor {
    pub translation_key: String,
    pub unique_id: String,
    pub entity_id: String,
    pub entity_picture: String,
}

/// Extra attributes shown next to the sensor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub level: String,
    pub last_update: Option<String>,
    pub last_poll: Option<String>,
    pub next_poll: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderate_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f64>,
}

/// Everything the host needs to display a sensor at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub unique_id: String,
    pub entity_id: String,
    pub name: String,
    pub state: i64,
    pub unit: &'static str,
    pub icon: &'static str,
    pub entity_picture: String,
    pub attributes: Option<SensorAttributes>,
}

impl PollenSensor {
    pub fn from_record(record: &PollenRecord) -> Self {
        let key = &record.translation_key;
        Self {
            translation_key: key.clone(),
            unique_id: format!("{}_{}", record.id, key),
            entity_id: format!("sensor.pollen_{key}"),
            entity_picture: record
                .pictures
                .first()
                .and_then(|p| p.path.clone())
                .unwrap_or_default(),
        }
    }

    pub fn name(&self, state: &PollenState, language: &str) -> String {
        let label = translate(
            state.translations(),
            &self.translation_key,
            TRANSLATION_DOMAIN,
            language,
        );
        format!("Pollen {label}")
    }

    /// Rounded pollen count, `0` when undetected, or [`STATE_UNAVAILABLE`].
    pub fn state(&self, state: &PollenState) -> i64 {
        match state.active_record(&self.translation_key) {
            Some(record) if record.level == LEVEL_UNDETECTED => 0,
            // Half-to-even, like the host's rounding.
            Some(record) => record.value.unwrap_or_default().round_ties_even() as i64,
            None => STATE_UNAVAILABLE,
        }
    }

    pub fn attributes(&self, state: &PollenState, language: &str) -> Option<SensorAttributes> {
        let record = state.active_record(&self.translation_key)?;
        let description = record
            .descriptions
            .first()
            .map(|key| translate(state.translations(), key, TRANSLATION_DOMAIN, language));

        let (moderate_threshold, high_threshold) = if record.threshold.is_empty() {
            (None, None)
        } else {
            (
                Some(threshold_min(&record.threshold, "medium")),
                Some(threshold_min(&record.threshold, "high")),
            )
        };

        Some(SensorAttributes {
            level: record.level.clone(),
            last_update: record.last_measurement_date.clone(),
            last_poll: state.last_poll.as_ref().map(format_poll_time),
            next_poll: state.next_poll.as_ref().map(format_poll_time),
            description,
            moderate_threshold,
            high_threshold,
        })
    }

    pub fn render(&self, state: &PollenState, language: &str) -> SensorSnapshot {
        SensorSnapshot {
            unique_id: self.unique_id.clone(),
            entity_id: self.entity_id.clone(),
            name: self.name(state, language),
            state: self.state(state),
            unit: UNIT,
            icon: ICON,
            entity_picture: self.entity_picture.clone(),
            attributes: self.attributes(state, language),
        }
    }
}

/// One sensor per active record, in feed order.
pub fn sensors_for(state: &PollenState) -> Vec<PollenSensor> {
    state
        .pollen
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|p| p.active)
        .map(PollenSensor::from_record)
        .collect()
}

fn threshold_min(thresholds: &[Threshold], kind: &str) -> f64 {
    thresholds
        .iter()
        .find(|t| t.kind == kind)
        .and_then(|t| t.min)
        .unwrap_or(MISSING_THRESHOLD)
}

fn format_poll_time(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
