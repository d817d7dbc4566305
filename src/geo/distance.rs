use crate::geo::LatLon;
use haversine::{distance, Location as HaversineLocation, Units};

/// Straight-line distance between two points of the same projected grid.
pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: a.0,
            longitude: a.1,
        },
        HaversineLocation {
            latitude: b.0,
            longitude: b.1,
        },
        Units::Kilometers,
    )
}

/// Returns the index of the candidate closest to `(x, y)` along with its distance.
///
/// Candidates are scanned in order and only replace the current best when strictly
/// closer, so among equidistant candidates the first one wins. Results depend on
/// input order and callers rely on that.
///
/// `coords` may fail; the first error aborts the scan.
pub fn nearest_by<T, E, F>(
    candidates: &[T],
    x: f64,
    y: f64,
    mut coords: F,
) -> Result<Option<(usize, f64)>, E>
where
    F: FnMut(&T) -> Result<(f64, f64), E>,
{
    let mut best: Option<(usize, f64)> = None;
    let mut min_distance = f64::INFINITY;
    for (i, candidate) in candidates.iter().enumerate() {
        let (cx, cy) = coords(candidate)?;
        let d = euclidean_distance(cx, cy, x, y);
        if d < min_distance {
            min_distance = d;
            best = Some((i, d));
        }
    }
    Ok(best)
}
