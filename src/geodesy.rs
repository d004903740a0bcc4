//! Geodesy primitives (C1): longitude arithmetic, great-circle azimuth,
//! and the unit-conversion constants shared by every other component.

/// Feet per international mile.
pub const FEET_PER_MILE: f64 = 5280.0;

/// Meters per international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Meters per international mile.
pub const METERS_PER_MILE: f64 = METERS_PER_FOOT * FEET_PER_MILE;

/// Kilometers per international mile.
pub const KM_PER_MILE: f64 = METERS_PER_MILE / 1000.0;

/// WGS-84 mean earth radius, in feet, as used for the local-earth
/// curvature approximation in the LOS kernel.
pub const EARTH_RADIUS_FEET: f64 = 20_902_230.97;

/// The 4/3-earth-radius factor used by the atmospheric-refraction
/// approximation that Longley-Rice-family models assume.
pub const FOUR_THIRDS: f64 = 4.0 / 3.0;

/// Signed shortest longitudinal difference `a - b`, normalized to
/// `(-180, 180]` degrees. Used for east/west ordering without a 360°
/// seam at the antimeridian.
#[must_use]
pub fn lon_diff(a: f64, b: f64) -> f64 {
    let mut diff = a - b;
    if diff <= -180.0 {
        diff += 360.0;
    }
    if diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// Normalize a longitude to `[0, 360)` degrees east of Greenwich.
#[must_use]
pub fn normalize_longitude(lon: f64) -> f64 {
    let mut lon = lon % 360.0;
    if lon < 0.0 {
        lon += 360.0;
    }
    lon
}

/// Great-circle bearing from `src` to `dst`, in degrees `[0, 360)`,
/// measured clockwise from true north.
///
/// Antipodal and coincident points have no well-defined bearing; callers
/// passing such pairs get whatever `atan2(0, 0)` resolves to (0°), an
/// accepted degenerate case.
#[must_use]
pub fn azimuth(src_lat: f64, src_lon: f64, dst_lat: f64, dst_lon: f64) -> f64 {
    let lat1 = src_lat.to_radians();
    let lat2 = dst_lat.to_radians();
    let dlon = (dst_lon - src_lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_positive_degrees(y.atan2(x).to_degrees())
}

fn normalize_positive_degrees(deg: f64) -> f64 {
    let mut deg = deg % 360.0;
    if deg < 0.0 {
        deg += 360.0;
    }
    deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn lon_diff_seam() {
        assert_float_eq!(lon_diff(179.0, -179.0), -2.0, abs <= 1e-9);
        assert_float_eq!(lon_diff(-179.0, 179.0), 2.0, abs <= 1e-9);
        assert_eq!(lon_diff(180.0, 0.0), 180.0);
        assert_eq!(lon_diff(10.0, 5.0), 5.0);
    }

    #[test]
    fn lon_diff_round_trip() {
        for (a, b) in [(10.0, 350.0), (0.0, 180.0), (123.4, 9.8), (300.0, 40.0)] {
            let sum = lon_diff(a, b) + lon_diff(b, a);
            let wrapped = ((sum + 180.0).rem_euclid(360.0)) - 180.0;
            assert!(wrapped.abs() < 1e-9, "a={a} b={b} sum={sum}");
        }
    }

    #[test]
    fn azimuth_cardinal_directions() {
        assert_float_eq!(azimuth(0.0, 0.0, 1.0, 0.0), 0.0, abs <= 1e-6); // due north
        assert_float_eq!(azimuth(0.0, 0.0, 0.0, 1.0), 90.0, abs <= 1e-6); // due east
        assert_float_eq!(azimuth(1.0, 0.0, 0.0, 0.0), 180.0, abs <= 1e-6); // due south
        assert_float_eq!(azimuth(0.0, 1.0, 0.0, 0.0), 270.0, abs <= 1e-6); // due west
    }

    #[test]
    fn azimuth_round_trip() {
        let pairs = [
            (40.0, -75.0, 51.5, -0.1),
            (-33.9, 151.2, 35.7, 139.7),
            (10.0, 10.0, 20.0, -20.0),
        ];
        for (lat1, lon1, lat2, lon2) in pairs {
            let fwd = azimuth(lat1, lon1, lat2, lon2);
            let rev = azimuth(lat2, lon2, lat1, lon1);
            let sum = (fwd + 180.0) % 360.0;
            let diff = (sum - rev).abs().min(360.0 - (sum - rev).abs());
            assert!(diff < 0.01, "fwd={fwd} rev={rev} sum={sum}");
        }
    }
}
