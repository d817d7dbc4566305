pub mod air_quality;
mod de;
mod environment;
mod error;
pub mod fetch;
pub mod geo;
pub mod geocode;
pub mod pollen;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use error::{EnvironmentError, ErrorKind};

pub use environment::*;

pub use geo::error::ProjectionError;
pub use geo::projection::{project, project_location};
pub use geo::{Crs, LatLon};

pub use air_quality::error::GridError;
pub use air_quality::{nearest_reading, AirQualityReading, GridCell, GridId, GridResponse, Pollutant};

pub use fetch::error::FetchError;
pub use fetch::{HeaderProfile, HttpFetcher};

pub use weather::error::GmlError;
pub use weather::{extract_weather, extract_weather_in, WeatherObservation};

pub use geocode::{AddressQuery, Geocoder};

pub use pollen::{ConfigEntry, EntryRegistry, PollenConfig, PollenCoordinator, PollenError, SensorSink};
