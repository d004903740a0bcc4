//! Trace output (C12): an optional per-cell text log of a propagation
//! pass, in `.plo` line format.
//!
//! Every line write takes a [`std::sync::Mutex`] around the writer so
//! concurrent sweep workers never interleave mid-line, without relying
//! on any libc stream-locking behavior.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// A handle to an open trace file. Cheap to share by reference across
/// sweep workers; every write is a complete line under the lock.
pub struct Trace {
    file: Mutex<BufWriter<File>>,
}

impl Trace {
    /// Open (or create) `path` for the trace output of one sweep run.
    pub fn create(path: &Path) -> crate::error::Result<Self> {
        let file = File::create(path)?;
        Ok(Trace {
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Write the single header line naming the sweep's bounding
    /// rectangle: `"max_west, min_west\tmax_north, min_north"`.
    pub fn write_header(&self, max_west: f64, min_west: f64, max_north: f64, min_north: f64) {
        self.write_line(&format!("{max_west:.3}, {min_west:.3}\t{max_north:.3}, {min_north:.3}"));
    }

    /// Write one processed-cell line: location, azimuth, first-
    /// obstruction elevation angle, and the pass's metric (path loss,
    /// field strength or received power, depending on the caller's
    /// signal-conversion mode), with a trailing `" *"` when the ray was
    /// obstructed.
    pub fn write_cell(&self, lat: f64, lon: f64, azimuth: f64, elevation: f64, metric: f64, obstructed: bool) {
        let suffix = if obstructed { " *" } else { "" };
        self.write_line(&format!("{lat:.7}, {lon:.7}, {azimuth:.3}, {elevation:.3}, {metric:.3}{suffix}"));
    }

    fn write_line(&self, line: &str) {
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(guard, "{line}") {
            log::warn!("trace write failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_cells() {
        let dir = std::env::temp_dir().join(format!("sigcover-trace-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trace.plo");

        let trace = Trace::create(&path).unwrap();
        trace.write_header(-80.0, -81.0, 40.0, 39.0);
        trace.write_cell(39.5, -80.5, 90.0, 1.2, 123.45, false);
        trace.write_cell(39.6, -80.4, 91.0, 2.0, 130.0, true);
        drop(trace);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("-80.000, -81.000\t40.000, 39.000"));
        assert!(contents.contains("123.450"));
        assert!(contents.trim_end().ends_with('*'));

        std::fs::remove_dir_all(&dir).ok();
    }
}
