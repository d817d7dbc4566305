//! Pollen counts from the pollen.lu API, exposed as sensors.
//!
//! Each configured [`ConfigEntry`] gets a [`PollenCoordinator`] that polls the
//! API on its own schedule. The [`EntryRegistry`] owns the coordinators and
//! their poll loops; rendered [`SensorSnapshot`]s are handed to the host
//! through a [`SensorSink`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod sensor;
pub mod types;

pub use config::{ConfigEntry, EntryOptions, PollenConfig};
pub use coordinator::{PollenCoordinator, SensorSink};
pub use error::PollenError;
pub use registry::EntryRegistry;
pub use sensor::{sensors_for, PollenSensor, SensorAttributes, SensorSnapshot};
pub use types::{translate, PollenRecord, PollenState, TranslationEntry};
