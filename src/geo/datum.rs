//! Ellipsoids and the 7-parameter datum shift.
//!
//! Geodetic coordinates are moved between datums through earth-centred
//! cartesian (ECEF) coordinates: geodetic -> ECEF -> Helmert -> ECEF -> geodetic.

const ARC_SECONDS_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// A reference ellipsoid, defined by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// Hayford 1924, used by LUREF.
    pub const INTERNATIONAL_1924: Ellipsoid = Ellipsoid {
        a: 6_378_388.0,
        f: 1.0 / 297.0,
    };

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Geodetic (radians, height in meters) to ECEF meters.
    pub fn to_geocentric(&self, lat: f64, lon: f64, h: f64) -> [f64; 3] {
        let e2 = self.e2();
        let sin_lat = lat.sin();
        let n = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        [
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - e2) + h) * sin_lat,
        ]
    }

    /// ECEF meters to geodetic (radians, height in meters).
    ///
    /// Fixed-point iteration on latitude; converges to sub-millimeter within a
    /// handful of steps for points near the surface.
    pub fn to_geodetic(&self, xyz: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = xyz;
        let e2 = self.e2();
        let lon = y.atan2(x);
        let p = (x * x + y * y).sqrt();

        let mut lat = z.atan2(p * (1.0 - e2));
        let mut h = 0.0;
        for _ in 0..10 {
            let sin_lat = lat.sin();
            let n = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            h = p / lat.cos() - n;
            let next = z.atan2(p * (1.0 - e2 * n / (n + h)));
            if (next - lat).abs() < 1e-14 {
                lat = next;
                break;
            }
            lat = next;
        }
        (lat, lon, h)
    }
}

/// Seven-parameter Helmert transformation, position-vector convention.
///
/// Rotations are in arc-seconds and scale in parts per million, matching the
/// way the parameters are published (`+towgs84=` style).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub ppm: f64,
}

impl Helmert {
    /// Luxembourg 1930 to WGS84.
    pub const LUREF_TO_WGS84: Helmert = Helmert {
        tx: -189.6806,
        ty: 18.3463,
        tz: -42.7695,
        rx: -0.33746,
        ry: -3.09264,
        rz: 2.53861,
        ppm: 0.4598,
    };

    pub fn apply(&self, xyz: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = xyz;
        let (rx, ry, rz) = self.rotations();
        let s = 1.0 + self.ppm * 1e-6;
        [
            self.tx + s * (x - rz * y + ry * z),
            self.ty + s * (rz * x + y - rx * z),
            self.tz + s * (-ry * x + rx * y + z),
        ]
    }

    /// Inverse of [`Helmert::apply`].
    ///
    /// Starts from the transposed small-angle rotation and refines with a few
    /// fixed-point corrections, which removes the second-order rotation error.
    pub fn invert(&self, xyz: [f64; 3]) -> [f64; 3] {
        let (rx, ry, rz) = self.rotations();
        let s = 1.0 + self.ppm * 1e-6;
        let x = (xyz[0] - self.tx) / s;
        let y = (xyz[1] - self.ty) / s;
        let z = (xyz[2] - self.tz) / s;
        let mut estimate = [x + rz * y - ry * z, -rz * x + y + rx * z, ry * x - rx * y + z];
        for _ in 0..3 {
            let forward = self.apply(estimate);
            for i in 0..3 {
                estimate[i] += (xyz[i] - forward[i]) / s;
            }
        }
        estimate
    }

    fn rotations(&self) -> (f64, f64, f64) {
        (
            self.rx * ARC_SECONDS_TO_RAD,
            self.ry * ARC_SECONDS_TO_RAD,
            self.rz * ARC_SECONDS_TO_RAD,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocentric_round_trip() {
        let lat = 49.6602_f64.to_radians();
        let lon = 5.9173_f64.to_radians();
        let xyz = Ellipsoid::INTERNATIONAL_1924.to_geocentric(lat, lon, 300.0);
        let (lat2, lon2, h2) = Ellipsoid::INTERNATIONAL_1924.to_geodetic(xyz);
        assert!((lat - lat2).abs() < 1e-11);
        assert!((lon - lon2).abs() < 1e-11);
        assert!((h2 - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_helmert_invert_undoes_apply() {
        let xyz = Ellipsoid::WGS84.to_geocentric(0.8667, 0.1033, 0.0);
        let shifted = Helmert::LUREF_TO_WGS84.apply(xyz);
        let back = Helmert::LUREF_TO_WGS84.invert(shifted);
        for i in 0..3 {
            assert!((xyz[i] - back[i]).abs() < 1e-3, "axis {i}: {} vs {}", xyz[i], back[i]);
        }
        // The shift itself is on the order of a couple of hundred meters.
        let moved = ((shifted[0] - xyz[0]).powi(2)
            + (shifted[1] - xyz[1]).powi(2)
            + (shifted[2] - xyz[2]).powi(2))
        .sqrt();
        assert!(moved > 50.0 && moved < 500.0, "moved {moved}");
    }
}
