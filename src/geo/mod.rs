//! Coordinate handling: reference systems, projections and distance helpers.
//!
//! The projections needed for the Luxembourg open-data grids are implemented
//! directly rather than through a PROJ binding. Only the three reference
//! systems the upstream APIs use are supported.

pub mod datum;
pub mod distance;
pub mod error;
pub mod laea;
pub mod projection;
pub mod transverse_mercator;

use std::fmt;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are in decimal degrees on WGS84.
///
/// # Examples
///
/// ```
/// use lu_environment::LatLon;
///
/// let luxembourg = LatLon(49.6116, 6.1319);
/// assert_eq!(luxembourg.0, 49.6116); // Latitude
/// assert_eq!(luxembourg.1, 6.1319); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// The coordinate reference systems used by the upstream data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, geographic longitude/latitude in degrees.
    Wgs84,
    /// EPSG:2169, the Luxembourg national grid. Air-quality grids are keyed on it.
    Luref,
    /// EPSG:3035, the European equal-area grid. Weather stations are positioned on it.
    Etrs89Laea,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::Luref => 2169,
            Crs::Etrs89Laea => 3035,
        }
    }
}

/// Formats as the `EPSG:<code>` identifier.
///
/// ```
/// use lu_environment::Crs;
///
/// assert_eq!(Crs::Luref.to_string(), "EPSG:2169");
/// ```
impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
