//! Lambert Azimuthal Equal Area projection, ellipsoidal oblique aspect.
//!
//! Used by EPSG:3035 (ETRS89-extended / LAEA Europe): origin 52°N 10°E on GRS80,
//! false easting 4 321 000 m, false northing 3 210 000 m.
//!
//! Formulas follow Snyder, "Map Projections: A Working Manual", pp. 187-190.

use crate::geo::datum::Ellipsoid;

#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    ellipsoid: Ellipsoid,
    /// Latitude of origin in radians
    lat0: f64,
    /// Central meridian in radians
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    /// Radius of the sphere of equal area
    rq: f64,
    qp: f64,
    sin_beta1: f64,
    cos_beta1: f64,
    d: f64,
}

impl LambertAzimuthalEqualArea {
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let lat0 = lat0_deg.to_radians();
        let e2 = ellipsoid.e2();
        let qp = authalic_q(&ellipsoid, std::f64::consts::FRAC_PI_2);
        let rq = ellipsoid.a * (qp / 2.0).sqrt();
        let beta1 = (authalic_q(&ellipsoid, lat0) / qp).asin();
        let m1 = lat0.cos() / (1.0 - e2 * lat0.sin().powi(2)).sqrt();
        let d = ellipsoid.a * m1 / (rq * beta1.cos());
        Self {
            ellipsoid,
            lat0,
            lon0: lon0_deg.to_radians(),
            false_easting,
            false_northing,
            rq,
            qp,
            sin_beta1: beta1.sin(),
            cos_beta1: beta1.cos(),
            d,
        }
    }

    /// EPSG:3035 parameters.
    pub fn etrs89_europe() -> Self {
        Self::new(Ellipsoid::GRS80, 52.0, 10.0, 4_321_000.0, 3_210_000.0)
    }

    /// Geographic degrees to projected meters. Returns `None` at the antipode of
    /// the origin, where the projection is undefined.
    pub fn forward(&self, lat_deg: f64, lon_deg: f64) -> Option<(f64, f64)> {
        let lat = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - self.lon0;
        let beta = (authalic_q(&self.ellipsoid, lat) / self.qp).clamp(-1.0, 1.0).asin();
        let (sin_beta, cos_beta) = beta.sin_cos();

        let denom = 1.0 + self.sin_beta1 * sin_beta + self.cos_beta1 * cos_beta * dlon.cos();
        if denom <= 1e-12 {
            return None;
        }
        let b = self.rq * (2.0 / denom).sqrt();
        let x = b * self.d * cos_beta * dlon.sin();
        let y = (b / self.d)
            * (self.cos_beta1 * sin_beta - self.sin_beta1 * cos_beta * dlon.cos());
        Some((x + self.false_easting, y + self.false_northing))
    }

    /// Projected meters to geographic degrees, as `(lat, lon)`.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rho = ((x / self.d).powi(2) + (self.d * y).powi(2)).sqrt();
        if rho < 1e-9 {
            return Some((self.lat0.to_degrees(), self.lon0.to_degrees()));
        }
        let ratio = rho / (2.0 * self.rq);
        if ratio > 1.0 {
            return None;
        }
        let ce = 2.0 * ratio.asin();
        let (sin_ce, cos_ce) = ce.sin_cos();

        let beta =
            (cos_ce * self.sin_beta1 + self.d * y * sin_ce * self.cos_beta1 / rho).asin();
        let lon = self.lon0
            + (x * sin_ce).atan2(
                self.d * rho * self.cos_beta1 * cos_ce
                    - self.d * self.d * y * self.sin_beta1 * sin_ce,
            );
        Some((authalic_to_geodetic(&self.ellipsoid, beta).to_degrees(), lon.to_degrees()))
    }
}

/// Snyder's q function (eq. 3-12).
fn authalic_q(ellipsoid: &Ellipsoid, lat: f64) -> f64 {
    let e = ellipsoid.e();
    let e2 = ellipsoid.e2();
    let sin_lat = lat.sin();
    let es = e * sin_lat;
    (1.0 - e2) * (sin_lat / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

/// Series inversion of authalic latitude (eq. 3-18).
fn authalic_to_geodetic(ellipsoid: &Ellipsoid, beta: f64) -> f64 {
    let e2 = ellipsoid.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    beta + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
        + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
        + (761.0 * e6 / 45360.0) * (6.0 * beta).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_false_origin() {
        let proj = LambertAzimuthalEqualArea::etrs89_europe();
        let (x, y) = proj.forward(52.0, 10.0).unwrap();
        assert!((x - 4_321_000.0).abs() < 1e-6);
        assert!((y - 3_210_000.0).abs() < 1e-6);

        let (lat, lon) = proj.inverse(4_321_000.0, 3_210_000.0).unwrap();
        assert!((lat - 52.0).abs() < 1e-9);
        assert!((lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_luxembourg_lands_in_expected_cell() {
        let proj = LambertAzimuthalEqualArea::etrs89_europe();
        let (x, y) = proj.forward(49.6602, 5.9173).unwrap();
        assert!(x > 4_000_000.0 && x < 4_060_000.0, "x = {x}");
        assert!(y > 2_920_000.0 && y < 2_990_000.0, "y = {y}");
    }

    #[test]
    fn test_round_trip() {
        let proj = LambertAzimuthalEqualArea::etrs89_europe();
        for (lat, lon) in [(49.6602, 5.9173), (38.7, -9.1), (64.1, 21.9), (52.0, 10.0001)] {
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert!((lat - lat2).abs() < 1e-6, "lat {lat} -> {lat2}");
            assert!((lon - lon2).abs() < 1e-6, "lon {lon} -> {lon2}");
        }
    }
}
