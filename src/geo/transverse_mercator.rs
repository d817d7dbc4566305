//! Transverse Mercator projection (Snyder, pp. 60-64).
//!
//! Used by EPSG:2169 (LUREF / Luxembourg TM): origin 49°50'N 6°10'E on the
//! International 1924 ellipsoid, scale 1.0, false origin (80 000, 100 000).
//! Accurate to well below a meter within a few degrees of the central meridian,
//! which is all a national grid needs.

use crate::geo::datum::Ellipsoid;

#[derive(Debug, Clone)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    /// Meridional arc at the latitude of origin
    m0: f64,
}

impl TransverseMercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let m0 = meridional_arc(&ellipsoid, lat0_deg.to_radians());
        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            k0,
            false_easting,
            false_northing,
            m0,
        }
    }

    /// EPSG:2169 parameters.
    pub fn luref() -> Self {
        Self::new(
            Ellipsoid::INTERNATIONAL_1924,
            49.0 + 50.0 / 60.0,
            6.0 + 10.0 / 60.0,
            1.0,
            80_000.0,
            100_000.0,
        )
    }

    /// Geographic degrees (on this projection's own datum) to projected meters.
    pub fn forward(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let ep2 = e2 / (1.0 - e2);

        let lat = lat_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let t = lat.tan().powi(2);
        let c = ep2 * cos_lat * cos_lat;
        let big_a = (lon_deg.to_radians() - self.lon0) * cos_lat;
        let m = meridional_arc(&self.ellipsoid, lat);

        let x = self.k0
            * n
            * (big_a
                + (1.0 - t + c) * big_a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0);
        let y = self.k0
            * (m - self.m0
                + n * lat.tan()
                    * (big_a.powi(2) / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * big_a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * big_a.powi(6)
                            / 720.0));
        (x + self.false_easting, y + self.false_northing)
    }

    /// Projected meters to geographic degrees, as `(lat, lon)`.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let m = self.m0 + (y - self.false_northing) / self.k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let lat1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = lat1.sin_cos();
        let tan1 = lat1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let n1 = a / (1.0 - e2 * sin1 * sin1).sqrt();
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
        let d = (x - self.false_easting) / (n1 * self.k0);

        let lat = lat1
            - (n1 * tan1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;
        (lat.to_degrees(), lon.to_degrees())
    }
}

/// Distance along the meridian from the equator (Snyder eq. 3-21).
fn meridional_arc(ellipsoid: &Ellipsoid, lat: f64) -> f64 {
    let e2 = ellipsoid.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    ellipsoid.a
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}
