//! `sigcover`: a coverage-sweep engine for radio-frequency propagation
//! mapping over a paged digital elevation model.
//!
//! The engine sweeps rays outward from a transmitter [`site::Site`]
//! across a perimeter rectangle, decomposed into four sections
//! ([`sweep`]) that each walk a [`path::Path`] of DEM samples
//! ([`dem`]) and either test line-of-sight visibility ([`los`]) or
//! evaluate a path-loss [`models`] against [`raster::Raster`] mask and
//! signal grids. Geodesy primitives ([`geodesy`]) and the shared
//! [`config::SweepConfig`] and [`error::Error`] types tie the rest
//! together.
//!
//! DEM paging, output-raster serialization, HTTP front ends and CLI
//! parsing are external collaborators and live outside this crate; it
//! consumes already-loaded elevation pages and antenna patterns and
//! mutates raster grids in place.

pub mod config;
pub mod dem;
pub mod error;
pub mod geodesy;
pub mod los;
pub mod models;
pub mod path;
pub mod propagation;
pub mod raster;
pub mod site;
pub mod sweep;
pub mod trace;

pub use config::{AntennaPattern, Lr, SweepConfig};
pub use dem::{Dem, Page};
pub use error::{Error, Result};
pub use models::Environment;
pub use site::Site;
pub use sweep::Engine;
