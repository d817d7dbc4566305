use crate::geo::datum::{Ellipsoid, Helmert};
use crate::geo::error::ProjectionError;
use crate::geo::laea::LambertAzimuthalEqualArea;
use crate::geo::transverse_mercator::TransverseMercator;
use crate::geo::{Crs, LatLon};

/// Transforms a coordinate between reference systems.
///
/// Axis order is always easting-first: `(lon, lat)` for [`Crs::Wgs84`] and
/// `(x, y)` for projected systems, on input and on output. Every transform pivots
/// through WGS84. ETRS89 and WGS84 are treated as identical, which holds to well
/// under a meter for this use.
///
/// # Errors
///
/// Returns [`ProjectionError::NonFinite`] for NaN/infinite input and
/// [`ProjectionError::OutOfDomain`] when a coordinate cannot be represented in the
/// target system.
///
/// # Examples
///
/// ```
/// use lu_environment::{project, Crs};
///
/// let (x, y) = project(5.9173, 49.6602, Crs::Wgs84, Crs::Etrs89Laea).unwrap();
/// let (lon, lat) = project(x, y, Crs::Etrs89Laea, Crs::Wgs84).unwrap();
/// assert!((lon - 5.9173).abs() < 1e-6);
/// assert!((lat - 49.6602).abs() < 1e-6);
/// ```
pub fn project(x: f64, y: f64, from: Crs, to: Crs) -> Result<(f64, f64), ProjectionError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ProjectionError::NonFinite(x, y));
    }
    if from == to {
        return Ok((x, y));
    }
    let (lon, lat) = to_wgs84(x, y, from)?;
    from_wgs84(lon, lat, to)
}

/// Projects a WGS84 location into `to`, returning `(x, y)`.
pub fn project_location(location: LatLon, to: Crs) -> Result<(f64, f64), ProjectionError> {
    project(location.longitude(), location.latitude(), Crs::Wgs84, to)
}

fn to_wgs84(x: f64, y: f64, from: Crs) -> Result<(f64, f64), ProjectionError> {
    match from {
        Crs::Wgs84 => Ok((x, y)),
        Crs::Etrs89Laea => {
            let (lat, lon) = LambertAzimuthalEqualArea::etrs89_europe()
                .inverse(x, y)
                .ok_or(ProjectionError::OutOfDomain { crs: from, x, y })?;
            Ok((lon, lat))
        }
        Crs::Luref => {
            let (lat, lon) = TransverseMercator::luref().inverse(x, y);
            let local = Ellipsoid::INTERNATIONAL_1924.to_geocentric(
                lat.to_radians(),
                lon.to_radians(),
                0.0,
            );
            let (lat, lon, _) =
                Ellipsoid::WGS84.to_geodetic(Helmert::LUREF_TO_WGS84.apply(local));
            Ok((lon.to_degrees(), lat.to_degrees()))
        }
    }
}

fn from_wgs84(lon: f64, lat: f64, to: Crs) -> Result<(f64, f64), ProjectionError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ProjectionError::OutOfDomain { crs: to, x: lon, y: lat });
    }
    match to {
        Crs::Wgs84 => Ok((lon, lat)),
        Crs::Etrs89Laea => LambertAzimuthalEqualArea::etrs89_europe()
            .forward(lat, lon)
            .ok_or(ProjectionError::OutOfDomain { crs: to, x: lon, y: lat }),
        Crs::Luref => {
            let global = Ellipsoid::WGS84.to_geocentric(lat.to_radians(), lon.to_radians(), 0.0);
            let (lat, lon, _) =
                Ellipsoid::INTERNATIONAL_1924.to_geodetic(Helmert::LUREF_TO_WGS84.invert(global));
            Ok(TransverseMercator::luref().forward(lat.to_degrees(), lon.to_degrees()))
        }
    }
}
