//! Nearest grid cell lookup for the modelled O3/NO2 concentration grids.
//!
//! Cell identifiers encode LUREF (EPSG:2169) coordinates, so the target point
//! must be given in LUREF metres as well.

pub mod error;
mod grid;

pub use grid::{GridCell, GridId, GridResponse};

use crate::air_quality::error::GridError;
use crate::geo::distance::nearest_by;
use serde::Serialize;
use std::fmt;

pub const O3_URL: &str =
    "https://data.public.lu/fr/datasets/r/c50542d0-ce59-4565-a8cb-48544ac18576";
pub const NO2_URL: &str =
    "https://data.public.lu/fr/datasets/r/5ce7c6fe-fc4c-4b5e-84c9-8d97b6a21c81";

/// Pollutants published as a grid on the open-data portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    O3,
    No2,
}

impl Pollutant {
    pub fn default_url(&self) -> &'static str {
        match self {
            Pollutant::O3 => O3_URL,
            Pollutant::No2 => NO2_URL,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pollutant::O3 => write!(f, "O3"),
            Pollutant::No2 => write!(f, "NO2"),
        }
    }
}

/// The grid cell closest to the requested point, along with the response
/// timestamp it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReading {
    pub date: String,
    pub hour: String,
    pub gc_id: String,
    pub value: f64,
    pub index: i64,
    /// Distance in metres between the cell centre and the target.
    pub distance: f64,
}

/// Finds the cell of `response` nearest to `(x, y)`.
///
/// Returns `Ok(None)` when the grid is empty or missing. Every `gc_id` is
/// parsed before comparing, so a single malformed id fails the lookup.
/// On equal distances the cell listed first is kept.
///
/// # Examples
///
/// ```
/// use lu_environment::air_quality::{nearest_reading, GridResponse};
///
/// let response: GridResponse = serde_json::from_str(r#"{
///     "date": "2024-06-12", "hour": "14",
///     "grid": [
///         {"gc_id": "X-10:Y-10", "value": 5, "index": 1},
///         {"gc_id": "X-0:Y-0", "value": 9, "index": 2}
///     ]
/// }"#).unwrap();
///
/// let reading = nearest_reading(&response, 1.0, 1.0).unwrap().unwrap();
/// assert_eq!(reading.gc_id, "X-0:Y-0");
/// ```
pub fn nearest_reading(
    response: &GridResponse,
    x: f64,
    y: f64,
) -> Result<Option<AirQualityReading>, GridError> {
    let cells = match response.grid.as_deref() {
        Some(cells) if !cells.is_empty() => cells,
        _ => return Ok(None),
    };

    let nearest = nearest_by(cells, x, y, |cell| {
        let id = cell.grid_id()?;
        Ok::<_, GridError>((id.x as f64, id.y as f64))
    })?;

    Ok(nearest.map(|(i, distance)| {
        let cell = &cells[i];
        AirQualityReading {
            date: response.date.clone(),
            hour: response.hour.clone(),
            gc_id: cell.gc_id.clone(),
            value: cell.value,
            index: cell.index,
            distance,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(grid: serde_json::Value) -> GridResponse {
        serde_json::from_value(json!({
            "date": "2024-06-12",
            "hour": 14,
            "grid": grid,
        }))
        .unwrap()
    }

    #[test]
    fn test_nearest_picks_closest_cell() {
        let response = response(json!([
            {"gc_id": "X-10:Y-10", "value": 5, "index": 1},
            {"gc_id": "X-0:Y-0", "value": 9, "index": 2},
        ]));
        let reading = nearest_reading(&response, 1.0, 1.0).unwrap().unwrap();
        assert_eq!(reading.gc_id, "X-0:Y-0");
        assert_eq!(reading.value, 9.0);
        assert_eq!(reading.index, 2);
        assert_eq!(reading.date, "2024-06-12");
        assert_eq!(reading.hour, "14");
        assert!((reading.distance - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_first_cell() {
        let response = response(json!([
            {"gc_id": "X-2:Y-0", "value": 1, "index": 1},
            {"gc_id": "X-0:Y-2", "value": 2, "index": 2},
            {"gc_id": "X--2:Y-0", "value": 3, "index": 3},
        ]));
        let reading = nearest_reading(&response, 0.0, 0.0).unwrap().unwrap();
        assert_eq!(reading.gc_id, "X-2:Y-0");
    }

    #[test]
    fn test_realistic_luref_target() {
        let response = response(json!([
            {"gc_id": "X-61000:Y-80000", "value": 41.2, "index": 2},
            {"gc_id": "X-62000:Y-80000", "value": 40.7, "index": 2},
            {"gc_id": "X-62000:Y-81000", "value": 39.9, "index": 1},
        ]));
        let reading = nearest_reading(&response, 61_890.46, 80_654.59)
            .unwrap()
            .unwrap();
        assert_eq!(reading.gc_id, "X-62000:Y-81000");
    }

    #[test]
    fn test_empty_grid_is_no_data() {
        let empty = response(json!([]));
        assert_eq!(nearest_reading(&empty, 0.0, 0.0).unwrap(), None);

        let absent: GridResponse =
            serde_json::from_value(json!({"date": "2024-06-12", "hour": "14"})).unwrap();
        assert_eq!(nearest_reading(&absent, 0.0, 0.0).unwrap(), None);
    }

    #[test]
    fn test_malformed_id_fails_lookup() {
        let response = response(json!([
            {"gc_id": "X-0:Y-0", "value": 1, "index": 1},
            {"gc_id": "cell-7", "value": 2, "index": 1},
        ]));
        let err = nearest_reading(&response, 0.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn test_pollutant_urls() {
        assert_eq!(Pollutant::O3.default_url(), O3_URL);
        assert_eq!(Pollutant::No2.to_string(), "NO2");
    }
}
