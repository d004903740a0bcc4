//! Propagation kernel (C7): per-ray model evaluation, antenna-pattern
//! integration and ERP-to-signal conversion.

use crate::config::SweepConfig;
use crate::dem::Dem;
use crate::geodesy::{FEET_PER_MILE, FOUR_THIRDS, METERS_PER_FOOT, METERS_PER_MILE};
use crate::models::{self, Environment, ModelContext, ModelId};
use crate::path::{self, Path};
use crate::raster::Raster;
use crate::site::Site;
use crate::trace::Trace;

/// A fixed 4/3-earth radius in feet, used only by this kernel's
/// first-obstruction-angle and model-distance geometry (the LOS kernel
/// instead uses [`SweepConfig::earth_radius`], which callers may
/// configure).
const FOUR_THIRDS_EARTH_FT: f64 = FOUR_THIRDS * crate::geodesy::EARTH_RADIUS_FEET;

/// Walk the ray from `src` to `dst`, evaluating `model` at each sample
/// and writing signal/mask updates for every cell this pass wins via
/// [`Raster::claim`].
#[allow(clippy::too_many_arguments)]
pub fn plot_prop_path(
    dem: &Dem,
    raster: &Raster,
    src: &Site,
    dst: &Site,
    dst_alt_ft: f64,
    config: &SweepConfig,
    model_id: i32,
    knifeedge: bool,
    environment: Environment,
    mask_value: u8,
    trace: Option<&Trace>,
) {
    let route = path::read_path(dem, src, dst);
    let n = route.length();
    if n < 3 {
        return;
    }

    let profile_len = n + 2;
    let mut elev = vec![0.0_f64; profile_len];
    fill_clutter_profile(&route, config.clutter, &mut elev);

    let model = ModelId::from_id(model_id);
    let generation_bits = mask_value << 3;

    for y in 2..n - 1 {
        if route.distance(y) > config.max_range {
            break;
        }
        let lat = route.lat(y);
        let lon = route.lon(y);
        if raster.get_mask(lat, lon) & 0xF8 == generation_bits {
            continue;
        }
        if !raster.claim(lat, lon) {
            continue;
        }

        let distance_ft = FEET_PER_MILE * route.distance(y);
        let xmtr_alt = FOUR_THIRDS_EARTH_FT + src.alt_ft() + route.elevation(0);
        let dest_alt = FOUR_THIRDS_EARTH_FT + dst_alt_ft + route.elevation(y);
        let cos_rcvr_angle = ((xmtr_alt * xmtr_alt + distance_ft * distance_ft - dest_alt * dest_alt)
            / (2.0 * xmtr_alt * distance_ft))
            .clamp(-1.0, 1.0);

        let want_elevation = config.got_elevation_pattern() || trace.is_some();
        let (obstructed, last_cos_test_angle) = if want_elevation {
            first_obstruction(&route, y, xmtr_alt, config.clutter, cos_rcvr_angle)
        } else {
            (false, 0.0)
        };
        let elevation_deg = if obstructed {
            last_cos_test_angle.acos().to_degrees() - 90.0
        } else {
            cos_rcvr_angle.acos().to_degrees() - 90.0
        };

        let intervals = (y - 1) as f64;
        let spacing_m = METERS_PER_MILE * (route.distance(y) - route.distance(y - 1));
        elev[0] = intervals;
        elev[1] = spacing_m;
        let dkm = spacing_m * intervals / 1000.0;

        let dest_elev_ft = route.elevation(y).max(1.0);
        let ctx = ModelContext {
            frequency_mhz: config.lr.frq_mhz,
            tx_alt_m: src.alt_ft() * METERS_PER_FOOT,
            rx_alt_m: (dest_elev_ft + dst_alt_ft) * METERS_PER_FOOT,
            distance_km: dkm,
            environment,
            profile_m: &elev[..y + 2],
            lr: &config.lr,
        };
        let output = models::evaluate(model, &ctx);
        let mut loss = output.loss_db;
        if config.debug && output.errnum != 0 {
            log::debug!("model {model:?} errnum={} mode={}", output.errnum, output.mode);
        }

        if knifeedge && model_id > 1 {
            loss += ked(config.lr.frq_mhz, dst_alt_ft * METERS_PER_FOOT, dkm, &elev);
        }

        let azimuth = src.azimuth_to(&Site::new(lat, lon, 0.0));
        let pattern = config.antenna_pattern.value_at(azimuth.round(), elevation_deg);
        if pattern != 0.0 {
            loss -= 20.0 * pattern.log10();
        }

        let (ifs, metric_value) = convert_signal(loss, config, raster, lat, lon);
        raster.put_signal(lat, lon, ifs);
        raster.put_mask(lat, lon, (raster.get_mask(lat, lon) & 7) + generation_bits);

        if let Some(trace) = trace {
            trace.write_cell(lat, lon, azimuth, elevation_deg, metric_value, obstructed);
        }
    }
}

/// Fill `elev[2..]` with per-sample heights in meters: interior samples
/// get `clutter` added unless their terrain height is exactly zero;
/// the two endpoints never do.
fn fill_clutter_profile(route: &Path, clutter_ft: f64, elev: &mut [f64]) {
    let n = route.length();
    for x in 1..n.saturating_sub(1) {
        let height_ft = route.elevation(x);
        let adjusted = if height_ft == 0.0 { height_ft } else { height_ft + clutter_ft };
        elev[x + 2] = adjusted * METERS_PER_FOOT;
    }
    elev[2] = route.elevation(0) * METERS_PER_FOOT;
    elev[n + 1] = route.elevation(n - 1) * METERS_PER_FOOT;
}

/// Elevation angle, as seen from the transmitter, of the first terrain
/// obstruction between sample `2` and `y` (exclusive of `y` itself),
/// compared against the fixed receiver angle `cos_rcvr_angle` (computed
/// once, from the transmitter to the actual destination at `y`).
/// Returns `(obstructed, last_cos_test_angle)`.
fn first_obstruction(route: &Path, y: usize, xmtr_alt: f64, clutter_ft: f64, cos_rcvr_angle: f64) -> (bool, f64) {
    let mut cos_test_angle = 0.0_f64;
    for x in 2..y {
        let distance = FEET_PER_MILE * route.distance(x);
        let height_ft = route.elevation(x);
        let test_alt = FOUR_THIRDS_EARTH_FT + if height_ft == 0.0 { height_ft } else { height_ft + clutter_ft };
        cos_test_angle = ((xmtr_alt * xmtr_alt + distance * distance - test_alt * test_alt) / (2.0 * xmtr_alt * distance))
            .clamp(-1.0, 1.0);
        if cos_rcvr_angle >= cos_test_angle {
            return (true, cos_test_angle);
        }
    }
    (false, cos_test_angle)
}

/// Acute angle from a receiver to an obstacle of height `opp` at
/// distance `adj`.
fn incidence_angle(opp: f64, adj: f64) -> f64 {
    opp.atan2(adj).to_degrees()
}

/// Knife-edge diffraction correction: walks the shared elevation
/// profile looking for terrain dips below the running high point, and
/// converts the steepest such dip's incidence angle into an additional
/// loss term.
fn ked(freq_mhz: f64, rx_alt_m: f64, dkm: f64, elev: &[f64]) -> f64 {
    let dkm_m = dkm * 1000.0;
    let spacing = elev[1];
    if spacing <= 0.0 {
        return 1.0;
    }
    let mut obstacle_height = 0.0_f64;
    let mut obstacle_distance = 0.0_f64;
    let mut rxobaoi = 0.0_f64;
    let mut n = 2usize;
    while (n as f64) < dkm_m / spacing {
        if n >= elev.len() {
            break;
        }
        let d = (n - 2) as f64 * spacing;
        if elev[n] < obstacle_height {
            rxobaoi = incidence_angle(obstacle_height - (elev[n] + rx_alt_m), d - obstacle_distance);
        } else {
            rxobaoi = 0.0;
        }
        if elev[n] > obstacle_height {
            obstacle_height = elev[n];
            obstacle_distance = d;
        }
        n += 1;
    }
    if rxobaoi >= 0.0 {
        rxobaoi / (300.0 / freq_mhz) + 3.0
    } else {
        1.0
    }
}

/// Convert `loss` (dB) into the raster's 8-bit signal axis, selecting
/// path-loss, field-strength or received-power mode per `config`.
/// Returns `(ifs, metric_value)`, the stored byte and the human-readable
/// metric this pass reports (used by trace output).
fn convert_signal(loss: f64, config: &SweepConfig, raster: &Raster, lat: f64, lon: f64) -> (u8, f64) {
    let existing = raster.get_signal(lat, lon);

    if config.lr.erp == 0.0 {
        let ifs = loss.round().clamp(0.0, 255.0) as u8;
        let ifs = if existing < ifs && existing != 0 { existing } else { ifs };
        return (ifs, loss);
    }

    if config.dbm {
        let rxp = config.lr.erp / 10f64.powf((loss - 2.14) / 10.0);
        let dbm = 10.0 * (rxp * 1000.0).log10();
        let ifs = (200.0 + dbm.round()).clamp(0.0, 255.0) as u8;
        let ifs = ifs.max(existing);
        (ifs, dbm)
    } else {
        let field_strength = 139.4 + 20.0 * config.lr.frq_mhz.log10() - loss + 10.0 * (config.lr.erp / 1000.0).log10();
        let ifs = (100.0 + field_strength.round()).clamp(0.0, 255.0) as u8;
        let ifs = ifs.max(existing);
        (ifs, field_strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dem::Page;

    fn flat_dem() -> Dem {
        let page = Page::new(-5.0, 5.0, 401, 0.025, vec![0.0; 401 * 401]).unwrap();
        Dem::new(vec![page]).unwrap()
    }

    #[test]
    fn fspl_path_loss_mode_keeps_smaller_nonzero_signal() {
        let dem = flat_dem();
        let raster = Raster::new(&dem);
        let src = Site::new(0.0, 0.0, 30.0);
        let dst = Site::new(0.5, 0.0, 2.0);
        let config = SweepConfig {
            max_range: 50.0,
            ..SweepConfig::default()
        };
        plot_prop_path(&dem, &raster, &src, &dst, 2.0, &config, 7, false, Environment::Rural, 1, None);
        let at_dest = raster.get_signal(dst.lat(), dst.lon());
        assert!(at_dest > 0);
    }

    #[test]
    fn erp_dbm_conversion_matches_known_example() {
        // ERP=100W, loss=100dB -> dBm = 10*log10((100/10^((100-2.14)/10))*1000)
        // ~ -47.86, ifs = 200 + round(-48) = 152.
        let config = SweepConfig {
            lr: crate::config::Lr {
                erp: 100.0,
                ..crate::config::Lr::default()
            },
            dbm: true,
            ..SweepConfig::default()
        };
        let dem = flat_dem();
        let raster = Raster::new(&dem);
        let (ifs, dbm) = convert_signal(100.0, &config, &raster, 1.0, 1.0);
        assert!((dbm - (-47.86)).abs() < 0.1, "dbm={dbm}");
        assert_eq!(ifs, 152);
    }

    #[test]
    fn generation_bits_are_set_after_processing() {
        let dem = flat_dem();
        let raster = Raster::new(&dem);
        let src = Site::new(0.0, 0.0, 30.0);
        let dst = Site::new(0.3, 0.0, 2.0);
        let config = SweepConfig::default();
        plot_prop_path(&dem, &raster, &src, &dst, 2.0, &config, 7, false, Environment::Rural, 1, None);
        let mask = raster.get_mask(dst.lat(), dst.lon());
        assert_eq!(mask & 0xF8, 1 << 3);
    }
}
