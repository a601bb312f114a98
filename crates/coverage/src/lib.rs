//! # Coverage
//!
//! Incremental union of per-frame field-of-view footprints into the ground
//! area observed over a flight, with near-duplicate vertex welding.
//!
//! ## Usage
//!
//! ```ignore
//! use coverage::{CoverageSweeper, GeoUnion};
//!
//! let mut sweeper = CoverageSweeper::new(config.coverage, GeoUnion);
//! let boundary = sweeper.update(&footprint);
//! ```

mod geo_union;
mod sweeper;
mod weld;

pub use geo_union::GeoUnion;
pub use sweeper::CoverageSweeper;
pub use weld::weld_ring;

// Re-export contracts types
pub use contracts::{CoverageConfig, CoverageMode, GeoPoint, GeoPolygon, PolygonUnion};
