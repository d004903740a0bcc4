//! DEM grid (C2): paged 2-D elevation lookup indexed by `(lat, lon)`.

use crate::error::{Error, Result};
use crate::geodesy::lon_diff;

/// Upper bound on the number of pages a [`Dem`] may hold.
pub const MAXPAGES: usize = 16;

/// One rectangular elevation page: an `ippd × ippd` grid of elevations
/// (feet above mean sea level), covering `[min_north, min_north + ippd*dpp)`
/// latitude and `(max_west - ippd*dpp, max_west]` longitude.
#[derive(Debug, Clone)]
pub struct Page {
    min_north: f64,
    max_west: f64,
    dpp: f64,
    ppd: f64,
    ippd: usize,
    mpi: usize,
    /// Row-major `elevation[x * ippd + y]`, feet AMSL.
    elevation: Vec<f32>,
}

impl Page {
    /// Build a page. `elevation` must have exactly `ippd * ippd` entries.
    pub fn new(min_north: f64, max_west: f64, ippd: usize, dpp: f64, elevation: Vec<f32>) -> Result<Self> {
        if ippd < 2 {
            return Err(Error::MalformedPage("ippd must be at least 2"));
        }
        if dpp <= 0.0 {
            return Err(Error::MalformedPage("dpp must be positive"));
        }
        if elevation.len() != ippd * ippd {
            return Err(Error::MalformedPage("elevation array size does not match ippd*ippd"));
        }
        Ok(Page {
            min_north,
            max_west,
            dpp,
            ppd: 1.0 / dpp,
            ippd,
            mpi: ippd - 1,
            elevation,
        })
    }

    #[must_use]
    pub fn ippd(&self) -> usize {
        self.ippd
    }

    #[must_use]
    pub fn dpp(&self) -> f64 {
        self.dpp
    }

    #[must_use]
    pub fn min_north(&self) -> f64 {
        self.min_north
    }

    #[must_use]
    pub fn max_west(&self) -> f64 {
        self.max_west
    }

    /// Elevation, in feet AMSL, at pixel `(x, y)`.
    #[must_use]
    pub fn elevation_at(&self, x: usize, y: usize) -> f64 {
        f64::from(self.elevation[x * self.ippd + y])
    }

    /// Map a geographic point to pixel coordinates within this page, if it
    /// falls inside it. Rounding is half-away-from-zero (`f64::round`);
    /// any deterministic tie-break is acceptable here.
    fn locate(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let x = (self.ppd * (lat - self.min_north)).round();
        let y = self.mpi as f64 - (self.ppd * lon_diff(self.max_west, lon)).round();

        if x < 0.0 || x > self.mpi as f64 || y < 0.0 || y > self.mpi as f64 {
            return None;
        }
        Some((x as usize, y as usize))
    }
}

/// An ordered, read-only collection of non-overlapping DEM pages.
#[derive(Debug, Clone, Default)]
pub struct Dem {
    pages: Vec<Page>,
}

impl Dem {
    /// Build a DEM from its pages, in registration order. Pages are
    /// trusted not to overlap (checked only by a cheap corner-point probe);
    /// a genuine overlap is an init-time inconsistency that should abort
    /// the run, per the error handling design.
    pub fn new(pages: Vec<Page>) -> Result<Self> {
        if pages.len() > MAXPAGES {
            return Err(Error::TooManyPages(pages.len(), MAXPAGES));
        }
        for (i, page) in pages.iter().enumerate() {
            let probe = (page.min_north, page.max_west);
            for (j, other) in pages.iter().enumerate() {
                if i == j {
                    continue;
                }
                if other.locate(probe.0, probe.1).is_some() {
                    return Err(Error::OverlappingPages(i));
                }
            }
        }
        Ok(Dem { pages })
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Locate the `(page, x, y)` triple containing `(lat, lon)`, scanning
    /// pages in registration order and accepting the first match.
    #[must_use]
    pub fn locate(&self, lat: f64, lon: f64) -> Option<(usize, usize, usize)> {
        for (index, page) in self.pages.iter().enumerate() {
            if let Some((x, y)) = page.locate(lat, lon) {
                return Some((index, x, y));
            }
        }
        None
    }

    /// Elevation at `(lat, lon)`, in feet AMSL, or `0.0` if the point lies
    /// outside every page (a DEM miss, which is not an error).
    #[must_use]
    pub fn elevation(&self, lat: f64, lon: f64) -> f64 {
        match self.locate(lat, lon) {
            Some((p, x, y)) => self.pages[p].elevation_at(x, y),
            None => 0.0,
        }
    }
}
