//! Path sampler (C3): the ordered sequence of DEM samples between two
//! sites, stepped at the DEM's angular resolution.

use crate::dem::Dem;
use crate::geodesy::{EARTH_RADIUS_FEET, FEET_PER_MILE};
use crate::site::Site;

/// Default angular step, in degrees, used when the DEM holds no pages to
/// read a resolution from (a degenerate but legal configuration).
const DEFAULT_DPP: f64 = 1.0 / 1200.0;

/// A source-ordered sequence of DEM samples along the great-circle arc
/// from a source to a destination. Sample `0` is the source; the last
/// sample is the destination. Regenerated per call; never cached.
#[derive(Debug, Clone, Default)]
pub struct Path {
    lat: Vec<f64>,
    lon: Vec<f64>,
    /// Cumulative distance from the source, in miles.
    dist: Vec<f64>,
    /// Elevation, in feet AMSL, from the DEM (0 if outside all pages).
    elev: Vec<f64>,
}

impl Path {
    #[must_use]
    pub fn length(&self) -> usize {
        self.lat.len()
    }

    #[must_use]
    pub fn lat(&self, i: usize) -> f64 {
        self.lat[i]
    }

    #[must_use]
    pub fn lon(&self, i: usize) -> f64 {
        self.lon[i]
    }

    #[must_use]
    pub fn distance(&self, i: usize) -> f64 {
        self.dist[i]
    }

    #[must_use]
    pub fn elevation(&self, i: usize) -> f64 {
        self.elev[i]
    }

    pub fn set_elevation(&mut self, i: usize, value: f64) {
        self.elev[i] = value;
    }
}

/// The angular step (degrees) the path sampler uses: the DEM's own pixel
/// resolution when it has pages, otherwise a sane default.
pub(crate) fn step_degrees(dem: &Dem) -> f64 {
    dem.pages().first().map_or(DEFAULT_DPP, |page| page.dpp())
}

/// Angular great-circle separation between two points, in radians, via
/// the spherical law of cosines.
fn angular_separation(src: &Site, dst: &Site) -> f64 {
    let lat1 = src.lat().to_radians();
    let lat2 = dst.lat().to_radians();
    let dlon = (dst.lon() - src.lon()).to_radians();
    let cos_sep = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos()).clamp(-1.0, 1.0);
    cos_sep.acos()
}

/// Great-circle intermediate point at fraction `f` (`0..=1`) of the way
/// from `src` to `dst`, given their total angular separation `delta`
/// (radians). Returns `(lat_deg, lon_deg)`.
fn intermediate_point(src: &Site, dst: &Site, delta: f64, f: f64) -> (f64, f64) {
    if delta.abs() < 1e-15 {
        return (src.lat(), src.lon());
    }
    let lat1 = src.lat().to_radians();
    let lon1 = src.lon().to_radians();
    let lat2 = dst.lat().to_radians();
    let lon2 = dst.lon().to_radians();

    let a = ((1.0 - f) * delta).sin() / delta.sin();
    let b = (f * delta).sin() / delta.sin();

    let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
    let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    let lat = z.atan2((x * x + y * y).sqrt());
    let lon = y.atan2(x);
    (lat.to_degrees(), crate::geodesy::normalize_longitude(lon.to_degrees()))
}

/// Produce the ordered DEM samples between `src` and `dst`.
#[must_use]
pub fn read_path(dem: &Dem, src: &Site, dst: &Site) -> Path {
    let dpp = step_degrees(dem);
    let delta = angular_separation(src, dst);
    let earth_radius_miles = EARTH_RADIUS_FEET / FEET_PER_MILE;
    let total_distance_miles = delta * earth_radius_miles;

    let total_deg = delta.to_degrees();
    let steps = if total_deg <= 0.0 {
        0
    } else {
        (total_deg / dpp).round().max(1.0) as usize
    };
    let length = steps + 1;

    let mut path = Path {
        lat: Vec::with_capacity(length),
        lon: Vec::with_capacity(length),
        dist: Vec::with_capacity(length),
        elev: Vec::with_capacity(length),
    };

    for i in 0..length {
        let f = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
        let (lat, lon) = if i == length - 1 {
            (dst.lat(), dst.lon())
        } else {
            intermediate_point(src, dst, delta, f)
        };
        let elevation = dem.elevation(lat, lon);
        path.lat.push(lat);
        path.lon.push(lon);
        path.dist.push(f * total_distance_miles);
        path.elev.push(elevation);
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dem::{Dem, Page};

    fn flat_dem() -> Dem {
        let page = Page::new(-5.0, 5.0, 101, 0.1, vec![0.0; 101 * 101]).unwrap();
        Dem::new(vec![page]).unwrap()
    }

    #[test]
    fn sample_zero_is_source_last_is_destination() {
        let dem = flat_dem();
        let src = Site::new(0.0, 0.0, 0.0);
        let dst = Site::new(1.0, 1.0, 0.0);
        let path = read_path(&dem, &src, &dst);
        assert!(path.length() >= 2);
        assert!((path.lat(0) - src.lat()).abs() < 1e-9);
        assert!((path.lon(0) - src.lon()).abs() < 1e-9);
        assert!((path.lat(path.length() - 1) - dst.lat()).abs() < 1e-6);
        assert!((path.lon(path.length() - 1) - dst.lon()).abs() < 1e-6);
    }

    #[test]
    fn distance_is_monotonic() {
        let dem = flat_dem();
        let src = Site::new(0.0, 0.0, 0.0);
        let dst = Site::new(2.0, 0.0, 0.0);
        let path = read_path(&dem, &src, &dst);
        for i in 1..path.length() {
            assert!(path.distance(i) >= path.distance(i - 1));
        }
    }

    #[test]
    fn coincident_points_yield_single_sample() {
        let dem = flat_dem();
        let src = Site::new(1.0, 1.0, 0.0);
        let path = read_path(&dem, &src, &src);
        assert_eq!(path.length(), 1);
        assert_eq!(path.distance(0), 0.0);
    }
}
