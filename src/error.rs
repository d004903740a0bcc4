use thiserror::Error;

/// The *sigcover* error enumeration.
///
/// Per the error handling design, only init-time inconsistencies abort a
/// run: DEM misses, model errors, worker-spawn failures and trace-write
/// failures are all absorbed inside the sweep and merely logged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    #[error("too many DEM pages: {0} exceeds MAXPAGES ({1})")]
    TooManyPages(usize, usize),

    #[error("malformed DEM page: {0}")]
    MalformedPage(&'static str),

    #[error("DEM pages overlap at page {0}")]
    OverlappingPages(usize),

    #[error("invalid sweep configuration: {0}")]
    BadConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
