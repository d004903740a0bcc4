//! Sweep configuration (C11): ground constants, antenna pattern and the
//! tunables that govern a single sweep run.

use crate::error::{Error, Result};

/// Ground electrical constants and atmospheric refractivity, passed
/// verbatim to every propagation model call.
///
/// Named `Lr` rather than a bare acronym so it reads as a type in Rust;
/// the field names keep their engineering meaning (surface dielectric
/// constant, conductivity, surface refractivity, radio climate, and the
/// two Longley-Rice variability knobs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lr {
    pub eps_dielect: f64,
    pub sgm_conductivity: f64,
    pub eno_ns_surfref: f64,
    pub frq_mhz: f64,
    pub radio_climate: i32,
    pub pol: i32,
    pub conf: f64,
    pub rel: f64,
    pub erp: f64,
}

impl Default for Lr {
    /// Typical-ground / 2-way-radio fallback constants.
    fn default() -> Self {
        Lr {
            eps_dielect: 15.0,
            sgm_conductivity: 0.005,
            eno_ns_surfref: 301.0,
            frq_mhz: 300.0,
            radio_climate: 5,
            pol: 0,
            conf: 0.50,
            rel: 0.50,
            erp: 0.0,
        }
    }
}

/// Number of elevation slots in one azimuth row of an [`AntennaPattern`]:
/// elevation `10°` down to `-90°` in `0.1°` steps.
pub const ANTENNA_PATTERN_ELEVATION_SLOTS: usize = 1001;

/// A receive antenna's azimuth-by-elevation gain pattern: `360` rows (one
/// per whole degree of azimuth), each `1001` columns (elevation `10°`
/// down to `-90°` in tenths of a degree, indexed by
/// `round(10*(10-elevation))`). Empty when the sweep uses no directional
/// pattern (isotropic receive antenna); a loaded pattern's zero entries
/// mean "no data for this angle", not "zero gain".
#[derive(Debug, Clone, Default)]
pub struct AntennaPattern {
    rows: Vec<Vec<f64>>,
}

impl AntennaPattern {
    /// Build a pattern from 360 azimuth rows of 1001 elevation samples
    /// each.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        if !rows.is_empty() {
            if rows.len() != 360 {
                return Err(Error::BadConfig("antenna pattern must have exactly 360 azimuth rows"));
            }
            if rows.iter().any(|row| row.len() != ANTENNA_PATTERN_ELEVATION_SLOTS) {
                return Err(Error::BadConfig("antenna pattern rows must have 1001 elevation slots"));
            }
        }
        Ok(AntennaPattern { rows })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Relative gain (linear, as loaded) at a given azimuth and
    /// elevation angle. `0.0` (no correction) when the pattern is empty
    /// or the angle falls outside the table's `[-90, 10]` range.
    #[must_use]
    pub fn value_at(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let az = (azimuth_deg.round() as i64).rem_euclid(360) as usize;
        let idx = (10.0 * (10.0 - elevation_deg)).round();
        if !(0.0..=(ANTENNA_PATTERN_ELEVATION_SLOTS - 1) as f64).contains(&idx) {
            return 0.0;
        }
        self.rows[az][idx as usize]
    }
}

/// Configuration for a single sweep run: everything [`crate::sweep`]
/// needs besides the transmitter site, the DEM and the raster.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Model-dependent ground constants and transmitter ERP (watts).
    pub lr: Lr,
    /// Maximum ray range, in miles.
    pub max_range: f64,
    /// Clutter height added to every ground elevation, in feet.
    pub clutter: f64,
    /// Earth radius used by the LOS kernel, in feet. Plain WGS-84 by
    /// default (see [`crate::geodesy::EARTH_RADIUS_FEET`]); the
    /// propagation kernel uses its own fixed 4/3-earth radius
    /// regardless of this value (see [`crate::geodesy::FOUR_THIRDS`]).
    pub earth_radius: f64,
    /// Report signal as dBm (`true`) rather than dBμV/m (`false`).
    pub dbm: bool,
    /// Report distances and heights in metric units.
    pub metric: bool,
    /// Enable verbose per-ray trace output, see [`crate::trace`].
    pub debug: bool,
    /// Receive antenna elevation-gain pattern.
    pub antenna_pattern: AntennaPattern,
    /// Run the sweep across a thread pool rather than on the calling
    /// thread. Disabling this is mostly useful for deterministic
    /// single-threaded test runs.
    pub use_threads: bool,
    /// Number of worker threads when `use_threads` is set. `0` asks for
    /// one worker per available core.
    pub worker_threads: usize,
}

impl SweepConfig {
    #[must_use]
    pub fn got_elevation_pattern(&self) -> bool {
        !self.antenna_pattern.is_empty()
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            lr: Lr::default(),
            max_range: 50.0,
            clutter: 0.0,
            earth_radius: crate::geodesy::EARTH_RADIUS_FEET,
            dbm: false,
            metric: false,
            debug: false,
            antenna_pattern: AntennaPattern::default(),
            use_threads: true,
            worker_threads: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_applies_no_correction() {
        let pattern = AntennaPattern::default();
        assert_eq!(pattern.value_at(45.0, 10.0), 0.0);
    }

    #[test]
    fn wrong_shape_rejected() {
        assert!(AntennaPattern::new(vec![vec![0.0; ANTENNA_PATTERN_ELEVATION_SLOTS]; 10]).is_err());
        assert!(AntennaPattern::new(vec![vec![0.0; 5]; 360]).is_err());
    }

    #[test]
    fn indexes_by_elevation_slot() {
        let mut rows = vec![vec![0.0; ANTENNA_PATTERN_ELEVATION_SLOTS]; 360];
        // elevation 10 -> idx 0; elevation -90 -> idx 1000.
        rows[90][0] = 0.5;
        rows[90][1000] = 0.25;
        let pattern = AntennaPattern::new(rows).unwrap();
        assert_eq!(pattern.value_at(90.0, 10.0), 0.5);
        assert_eq!(pattern.value_at(90.0, -90.0), 0.25);
        assert_eq!(pattern.value_at(90.0, -91.0), 0.0);
    }
}
