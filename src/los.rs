//! LOS kernel (C6): the per-ray cosine-of-elevation obstruction test.

use crate::config::SweepConfig;
use crate::dem::Dem;
use crate::geodesy::FEET_PER_MILE;
use crate::path::{self, Path};
use crate::raster::Raster;
use crate::site::Site;

/// Walk the ray from `src` to `dst`, marking every unobstructed sample
/// along the way with `mask_value` in the raster's mask grid.
///
/// Processes samples `0..path.length()-1` (one short of the
/// destination) while cumulative distance is within `config.max_range`.
/// A sample already carrying `mask_value`, or one [`Raster::claim`]
/// can't win for this pass, is left untouched.
pub fn plot_los_path(dem: &Dem, raster: &Raster, src: &Site, dst: &Site, dst_alt_ft: f64, config: &SweepConfig, mask_value: u8) {
    let route = path::read_path(dem, src, dst);
    let n = route.length();
    if n < 2 {
        return;
    }
    for y in 0..n - 1 {
        if route.distance(y) > config.max_range {
            break;
        }
        let lat = route.lat(y);
        let lon = route.lon(y);
        if raster.get_mask(lat, lon) & mask_value != 0 {
            continue;
        }
        if !raster.claim(lat, lon) {
            continue;
        }
        if !obstructed(&route, y, src.alt_ft(), dst_alt_ft, config) {
            raster.or_mask(lat, lon, mask_value);
        }
    }
}

/// Is sample `y` of `route` obstructed from `src`'s transmitter, given a
/// receiver at `dst_alt_ft` AGL? Shared by [`plot_los_path`] and
/// [`plot_path`]. At `x == y` the baseline distance is zero, which
/// IEEE-754 resolves to ±∞ and therefore never itself triggers
/// obstruction.
fn obstructed(route: &Path, y: usize, src_alt_ft: f64, dst_alt_ft: f64, config: &SweepConfig) -> bool {
    let distance = FEET_PER_MILE * route.distance(y);
    let tx_alt = config.earth_radius + src_alt_ft + route.elevation(0);
    let rx_alt = config.earth_radius + dst_alt_ft + route.elevation(y);

    let cos_xmtr_angle = (rx_alt * rx_alt + distance * distance - tx_alt * tx_alt) / (2.0 * rx_alt * distance);

    for x in (0..=y).rev() {
        let dist_x = FEET_PER_MILE * (route.distance(y) - route.distance(x));
        let clutter = if route.elevation(x) == 0.0 { 0.0 } else { config.clutter };
        let test_alt = config.earth_radius + route.elevation(x) + clutter;
        let cos_test_angle = (rx_alt * rx_alt + dist_x * dist_x - test_alt * test_alt) / (2.0 * rx_alt * dist_x);
        if cos_xmtr_angle >= cos_test_angle {
            return true;
        }
    }
    false
}

/// A single, standalone LOS query between two sites: is `dst` visible
/// from `src`, ignoring `max_range` and without touching the raster?
///
/// A third LOS variant alongside [`plot_los_path`], kept here as a
/// plain query rather than a raster-mutating pass: the sweep
/// orchestrator never calls this; it's a convenience for one-off
/// visibility checks.
#[must_use]
pub fn plot_path(dem: &Dem, src: &Site, dst: &Site, dst_alt_ft: f64, config: &SweepConfig) -> bool {
    let route = path::read_path(dem, src, dst);
    if route.length() == 0 {
        return true;
    }
    let last = route.length() - 1;
    !obstructed(&route, last, src.alt_ft(), dst_alt_ft, config)
}
