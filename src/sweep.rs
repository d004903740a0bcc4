//! Sweep orchestrator (C8): four-quadrant perimeter decomposition and
//! worker dispatch for one LOS or propagation pass.

use std::path::Path as FsPath;

use crate::config::SweepConfig;
use crate::dem::Dem;
use crate::error::Result;
use crate::geodesy::lon_diff;
use crate::models::Environment;
use crate::raster::Raster;
use crate::site::Site;
use crate::trace::Trace;
use crate::{los, path, propagation};

/// Number of perimeter sections a sweep is split into: one per
/// rectangle edge.
const NUM_SECTIONS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_north: f64,
    max_north: f64,
    min_west: f64,
    max_west: f64,
}

impl Bounds {
    fn of(dem: &Dem) -> Option<Self> {
        let mut b: Option<Bounds> = None;
        for page in dem.pages() {
            let north_extent = page.min_north() + (page.ippd() - 1) as f64 * page.dpp();
            let west_extent = page.max_west() - (page.ippd() - 1) as f64 * page.dpp();
            b = Some(match b {
                None => Bounds {
                    min_north: page.min_north(),
                    max_north: north_extent,
                    min_west: west_extent,
                    max_west: page.max_west(),
                },
                Some(prev) => Bounds {
                    min_north: prev.min_north.min(page.min_north()),
                    max_north: prev.max_north.max(north_extent),
                    min_west: prev.min_west.min(west_extent),
                    max_west: prev.max_west.max(page.max_west()),
                },
            });
        }
        b
    }
}

#[derive(Debug, Clone, Copy)]
struct Section {
    min_west: f64,
    max_west: f64,
    min_north: f64,
    max_north: f64,
    eastwest: bool,
}

/// North edge E→W, east edge N→S, south edge E→W, west edge N→S.
fn sections(bounds: Bounds) -> [Section; NUM_SECTIONS] {
    let min_west = [bounds.min_west, bounds.min_west, bounds.min_west, bounds.max_west];
    let min_north = [bounds.max_north, bounds.min_north, bounds.min_north, bounds.min_north];
    let max_west = [bounds.max_west, bounds.min_west, bounds.max_west, bounds.max_west];
    let max_north = [bounds.max_north, bounds.max_north, bounds.min_north, bounds.max_north];

    std::array::from_fn(|i| Section {
        min_west: min_west[i],
        max_west: max_west[i],
        min_north: min_north[i],
        max_north: max_north[i],
        eastwest: min_west[i] != max_west[i],
    })
}

/// Enumerate one section's destinations, spaced `dpp` apart along its
/// varying axis, invoking `visit(lat, lon)` for each. A do-while
/// traversal: at least one destination is always visited.
fn walk_section(section: Section, dpp: f64, mut visit: impl FnMut(f64, f64)) {
    let minwest = dpp + section.min_west;
    let mut lon = if section.eastwest { minwest } else { section.min_west };
    let mut lat = section.min_north;
    let mut y: u64 = 0;

    loop {
        if lon >= 360.0 {
            lon -= 360.0;
        }
        visit(lat, lon);

        y += 1;
        if section.eastwest {
            lon = minwest + dpp * y as f64;
        } else {
            lat = section.min_north + dpp * y as f64;
        }

        let keep_going = if section.eastwest {
            lon_diff(lon, section.max_west) <= 0.0
        } else {
            lat < section.max_north
        };
        if !keep_going {
            break;
        }
    }
}

/// Owns the DEM and raster for a run and exposes the two sweep
/// entrypoints. Per-call tunables (ground constants, max range,
/// clutter, earth radius, unit/report mode) live in `config`, set by
/// the caller before sweeping rather than in process-wide globals.
pub struct Engine {
    dem: Dem,
    raster: Raster,
    bounds: Option<Bounds>,
    pub config: SweepConfig,
    los_mask_value: u8,
    prop_mask_value: u8,
}

impl Engine {
    #[must_use]
    pub fn new(dem: Dem, config: SweepConfig) -> Self {
        let raster = Raster::new(&dem);
        let bounds = Bounds::of(&dem);
        Engine {
            dem,
            raster,
            bounds,
            config,
            los_mask_value: 1,
            prop_mask_value: 1,
        }
    }

    #[must_use]
    pub fn dem(&self) -> &Dem {
        &self.dem
    }

    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Sweep a 360-degree line-of-sight map around `src` for a receiver
    /// at `altitude_ft` AGL.
    pub fn plot_los_map(&mut self, src: &Site, altitude_ft: f64, trace_path: Option<&FsPath>, use_threads: bool) -> Result<()> {
        let Some(bounds) = self.bounds else { return Ok(()) };
        let trace = trace_path.map(Trace::create).transpose()?;
        if let Some(trace) = &trace {
            trace.write_header(bounds.max_west, bounds.min_west, bounds.max_north, bounds.min_north);
        }

        let dpp = path::step_degrees(&self.dem);
        let mask_value = self.los_mask_value;
        let dem = &self.dem;
        let raster = &self.raster;
        let config = &self.config;

        let run_section = move |section: Section| {
            walk_section(section, dpp, |lat, lon| {
                let dst = Site::new(lat, lon, altitude_ft);
                los::plot_los_path(dem, raster, src, &dst, altitude_ft, config, mask_value);
            });
        };
        run_sections(sections(bounds), use_threads, run_section);

        self.los_mask_value = match self.los_mask_value {
            1 => 8,
            8 => 16,
            16 => 32,
            other => other,
        };
        Ok(())
    }

    /// Sweep a 360-degree propagation map around `src`. `haf` restricts
    /// the pass to half the perimeter: `1` the first two sections, `2`
    /// the last two, anything else the full sweep.
    #[allow(clippy::too_many_arguments)]
    pub fn plot_propagation(
        &mut self,
        src: &Site,
        altitude_ft: f64,
        trace_path: Option<&FsPath>,
        propmodel: i32,
        knifeedge: bool,
        haf: u8,
        pmenv: Environment,
        use_threads: bool,
    ) -> Result<()> {
        let Some(bounds) = self.bounds else { return Ok(()) };
        let trace = trace_path.map(Trace::create).transpose()?;
        if let Some(trace) = &trace {
            trace.write_header(bounds.max_west, bounds.min_west, bounds.max_north, bounds.min_north);
        }

        let dpp = path::step_degrees(&self.dem);
        let mask_value = self.prop_mask_value;
        let dem = &self.dem;
        let raster = &self.raster;
        let config = &self.config;
        let trace_ref = trace.as_ref();

        let all_sections = sections(bounds);
        let run_section = move |section: Section| {
            walk_section(section, dpp, |lat, lon| {
                let dst = Site::new(lat, lon, altitude_ft);
                propagation::plot_prop_path(
                    dem, raster, src, &dst, altitude_ft, config, propmodel, knifeedge, pmenv, mask_value, trace_ref,
                );
            });
        };

        let selected: Vec<Section> = all_sections
            .into_iter()
            .enumerate()
            .filter(|(i, _)| {
                let from_end = NUM_SECTIONS - i;
                !(from_end <= NUM_SECTIONS / 2 && haf == 1) && !(from_end > NUM_SECTIONS / 2 && haf == 2)
            })
            .map(|(_, s)| s)
            .collect();
        run_sections_vec(selected, use_threads, run_section);

        if self.prop_mask_value < 30 {
            self.prop_mask_value += 1;
        }
        Ok(())
    }
}

/// Run all four sections, either on up to four scoped worker threads or
/// sequentially on the calling thread.
fn run_sections(all: [Section; NUM_SECTIONS], use_threads: bool, run: impl Fn(Section) + Sync) {
    run_sections_vec(all.to_vec(), use_threads, run);
}

fn run_sections_vec(selected: Vec<Section>, use_threads: bool, run: impl Fn(Section) + Sync) {
    if !use_threads {
        for section in selected {
            run(section);
        }
        return;
    }
    std::thread::scope(|scope| {
        for section in selected {
            scope.spawn(|| run(section));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dem::Page;

    fn flat_dem() -> Dem {
        let page = Page::new(-1.0, 1.0, 81, 0.025, vec![0.0; 81 * 81]).unwrap();
        Dem::new(vec![page]).unwrap()
    }

    #[test]
    fn los_sweep_marks_cells_within_range() {
        let dem = flat_dem();
        let config = SweepConfig {
            max_range: 1.0,
            ..SweepConfig::default()
        };
        let mut engine = Engine::new(dem, config);
        let src = Site::new(0.0, 0.0, 100.0);
        engine.plot_los_map(&src, 10.0, None, false).unwrap();

        let mut marked = 0;
        for page in engine.dem().pages() {
            for x in 0..page.ippd() {
                for y in 0..page.ippd() {
                    let lat = page.min_north() + x as f64 * page.dpp();
                    let lon = page.max_west() - (page.ippd() - 1 - y) as f64 * page.dpp();
                    if engine.raster().get_mask(lat, lon) & 1 != 0 {
                        marked += 1;
                    }
                }
            }
        }
        assert!(marked > 0);
    }

    #[test]
    fn sequential_and_threaded_sweeps_agree() {
        let dem = flat_dem();
        let config = SweepConfig {
            max_range: 1.0,
            ..SweepConfig::default()
        };
        let src = Site::new(0.0, 0.0, 100.0);

        let mut sequential = Engine::new(dem.clone(), config.clone());
        sequential.plot_los_map(&src, 10.0, None, false).unwrap();

        let mut threaded = Engine::new(dem, config);
        threaded.plot_los_map(&src, 10.0, None, true).unwrap();

        for page in threaded.dem().pages() {
            for x in 0..page.ippd() {
                for y in 0..page.ippd() {
                    let lat = page.min_north() + x as f64 * page.dpp();
                    let lon = page.max_west() - (page.ippd() - 1 - y) as f64 * page.dpp();
                    assert_eq!(sequential.raster().get_mask(lat, lon), threaded.raster().get_mask(lat, lon));
                    assert_eq!(sequential.raster().get_signal(lat, lon), threaded.raster().get_signal(lat, lon));
                }
            }
        }
    }

    #[test]
    fn half_sweep_union_covers_full_sweep() {
        let dem = flat_dem();
        let config = SweepConfig {
            max_range: 1.0,
            ..SweepConfig::default()
        };
        let src = Site::new(0.0, 0.0, 100.0);

        let mut first_half = Engine::new(dem.clone(), config.clone());
        first_half
            .plot_propagation(&src, 10.0, None, 7, false, 1, Environment::Rural, false)
            .unwrap();
        let mut second_half = Engine::new(dem, config);
        second_half
            .plot_propagation(&src, 10.0, None, 7, false, 2, Environment::Rural, false)
            .unwrap();

        // Disjoint halves: a cell fully covered by one half should not
        // have been separately claimed by the other.
        let mut overlap = 0;
        for page in first_half.dem().pages() {
            for x in 0..page.ippd() {
                for y in 0..page.ippd() {
                    let lat = page.min_north() + x as f64 * page.dpp();
                    let lon = page.max_west() - (page.ippd() - 1 - y) as f64 * page.dpp();
                    let a = first_half.raster().get_mask(lat, lon) & 0xF8;
                    let b = second_half.raster().get_mask(lat, lon) & 0xF8;
                    if a != 0 && b != 0 {
                        overlap += 1;
                    }
                }
            }
        }
        assert_eq!(overlap, 0);
    }
}
