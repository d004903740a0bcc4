//! Raster state (C4): the mask, signal and processed grids shared by all
//! sweep workers, and the primitives that read and mutate them.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::dem::Dem;
use crate::geodesy::lon_diff;

struct RasterPage {
    min_north: f64,
    max_west: f64,
    ppd: f64,
    ippd: usize,
    mpi: usize,
    mask: Vec<AtomicU8>,
    signal: Vec<AtomicU8>,
    processed: Vec<AtomicBool>,
}

impl RasterPage {
    fn new(min_north: f64, max_west: f64, ippd: usize, dpp: f64) -> Self {
        let n = ippd * ippd;
        RasterPage {
            min_north,
            max_west,
            ppd: 1.0 / dpp,
            ippd,
            mpi: ippd - 1,
            mask: (0..n).map(|_| AtomicU8::new(0)).collect(),
            signal: (0..n).map(|_| AtomicU8::new(0)).collect(),
            processed: (0..n).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    fn locate(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let x = (self.ppd * (lat - self.min_north)).round();
        let y = self.mpi as f64 - (self.ppd * lon_diff(self.max_west, lon)).round();
        if x < 0.0 || x > self.mpi as f64 || y < 0.0 || y > self.mpi as f64 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.ippd + y
    }
}

/// Parallel-to-the-DEM raster state: `mask`, `signal` and `processed`
/// grids, one triple per DEM page.
///
/// `mask` and `signal` are [`AtomicU8`] rather than plain bytes so the
/// type is `Sync` without a lock; every write to a given cell happens on
/// the thread that won that cell's [`Raster::claim`], so `Relaxed`
/// ordering is sufficient for them. `claim` itself uses `AcqRel` so the
/// processed-flag transition is a real synchronization point.
#[derive(Default)]
pub struct Raster {
    pages: Vec<RasterPage>,
}

impl Raster {
    /// Allocate raster grids shaped like `dem`'s pages. Allocated once per
    /// run; an allocation failure here is the one init-time condition
    /// that should abort the run (Rust's allocator aborts on its own).
    #[must_use]
    pub fn new(dem: &Dem) -> Self {
        let pages = dem
            .pages()
            .iter()
            .map(|p| RasterPage::new(p.min_north(), p.max_west(), p.ippd(), p.dpp()))
            .collect();
        Raster { pages }
    }

    fn locate(&self, lat: f64, lon: f64) -> Option<(usize, usize, usize)> {
        for (index, page) in self.pages.iter().enumerate() {
            if let Some((x, y)) = page.locate(lat, lon) {
                return Some((index, x, y));
            }
        }
        None
    }

    #[must_use]
    pub fn get_mask(&self, lat: f64, lon: f64) -> u8 {
        match self.locate(lat, lon) {
            Some((p, x, y)) => {
                let page = &self.pages[p];
                page.mask[page.index(x, y)].load(Ordering::Relaxed)
            }
            None => 0,
        }
    }

    pub fn or_mask(&self, lat: f64, lon: f64, bits: u8) {
        if let Some((p, x, y)) = self.locate(lat, lon) {
            let page = &self.pages[p];
            page.mask[page.index(x, y)].fetch_or(bits, Ordering::Relaxed);
        }
    }

    pub fn put_mask(&self, lat: f64, lon: f64, value: u8) {
        if let Some((p, x, y)) = self.locate(lat, lon) {
            let page = &self.pages[p];
            page.mask[page.index(x, y)].store(value, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn get_signal(&self, lat: f64, lon: f64) -> u8 {
        match self.locate(lat, lon) {
            Some((p, x, y)) => {
                let page = &self.pages[p];
                page.signal[page.index(x, y)].load(Ordering::Relaxed)
            }
            None => 0,
        }
    }

    pub fn put_signal(&self, lat: f64, lon: f64, value: u8) {
        if let Some((p, x, y)) = self.locate(lat, lon) {
            let page = &self.pages[p];
            page.signal[page.index(x, y)].store(value, Ordering::Relaxed);
        }
    }

    /// Atomically transition `processed` from `false` to `true` for the
    /// cell at `(lat, lon)`. Returns `true` iff the caller now owns the
    /// cell for this pass; points outside every page always return
    /// `false` (a DEM miss, silently ignored by callers).
    #[must_use]
    pub fn claim(&self, lat: f64, lon: f64) -> bool {
        let Some((p, x, y)) = self.locate(lat, lon) else {
            return false;
        };
        let page = &self.pages[p];
        let cell = &page.processed[page.index(x, y)];
        // Fast path: processed is monotone, so a relaxed read of `true`
        // can never be a stale false negative.
        if cell.load(Ordering::Relaxed) {
            return false;
        }
        cell.compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }
}
