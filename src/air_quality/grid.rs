//! Deserialized shape of the air-quality grid endpoints.

use crate::air_quality::error::GridError;
use crate::de::{integer_lenient, string_or_number};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A full grid response: `{"date", "hour", "grid": [...]}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub hour: String,
    /// Absent and empty grids are both treated as "no data".
    #[serde(default)]
    pub grid: Option<Vec<GridCell>>,
}

/// One cell of the modelled pollutant grid.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridCell {
    /// Cell identifier encoding LUREF coordinates, e.g. `X-62000:Y-81000`.
    pub gc_id: String,
    /// Concentration in µg/m³.
    pub value: f64,
    /// Air-quality classification index.
    #[serde(deserialize_with = "integer_lenient")]
    pub index: i64,
}

impl GridCell {
    pub fn grid_id(&self) -> Result<GridId, GridError> {
        self.gc_id.parse()
    }
}

/// Integer grid coordinates parsed from a `gc_id`.
///
/// # Examples
///
/// ```
/// use lu_environment::GridId;
///
/// let id: GridId = "X-62000:Y-81000".parse().unwrap();
/// assert_eq!((id.x, id.y), (62000, 81000));
/// assert_eq!(id.to_string(), "X-62000:Y-81000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId {
    pub x: i64,
    pub y: i64,
}

impl FromStr for GridId {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| GridError::InvalidId {
            id: s.to_string(),
            reason,
        };
        let (x_part, y_part) = s.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
        let x = x_part
            .strip_prefix("X-")
            .ok_or_else(|| invalid("missing 'X-' prefix"))?
            .parse::<i64>()
            .map_err(|_| invalid("x is not an integer"))?;
        let y = y_part
            .strip_prefix("Y-")
            .ok_or_else(|| invalid("missing 'Y-' prefix"))?
            .parse::<i64>()
            .map_err(|_| invalid("y is not an integer"))?;
        Ok(GridId { x, y })
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X-{}:Y-{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_id_round_trip() {
        for (a, b) in [
            (0, 0),
            (62_000, 81_000),
            (-5, 3),
            (7, -12),
            (i64::MIN, i64::MAX),
            (i64::MAX, i64::MIN),
        ] {
            let id = GridId { x: a, y: b };
            let parsed: GridId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id, "round trip of {id}");
        }
    }

    #[test]
    fn test_grid_id_rejects_malformed() {
        for bad in ["", "X-1", "X-1;Y-2", "Y-1:X-2", "X-a:Y-2", "X-1:Y-2.5", "1:2", "X-1:Y-"] {
            let err = bad.parse::<GridId>().unwrap_err();
            assert!(matches!(err, GridError::InvalidId { .. }), "{bad} should fail");
        }
    }

    #[test]
    fn test_deserialize_response() {
        let json = r#"{
            "date": "2024-06-12",
            "hour": 14,
            "grid": [
                {"gc_id": "X-10:Y-10", "value": 5, "index": 1},
                {"gc_id": "X-0:Y-0", "value": 9.5, "index": 2.0}
            ]
        }"#;
        let response: GridResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.date, "2024-06-12");
        assert_eq!(response.hour, "14");
        let grid = response.grid.unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1].value, 9.5);
        assert_eq!(grid[1].index, 2);
    }

    #[test]
    fn test_deserialize_missing_grid() {
        let response: GridResponse =
            serde_json::from_str(r#"{"date": "2024-06-12", "hour": "14:00"}"#).unwrap();
        assert!(response.grid.is_none());
    }

    #[test]
    fn test_fractional_index_rejected() {
        let json = r#"{"gc_id": "X-0:Y-0", "value": 1, "index": 1.5}"#;
        assert!(serde_json::from_str::<GridCell>(json).is_err());
    }
}
