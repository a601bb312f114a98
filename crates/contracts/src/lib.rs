//! # Contracts
//!
//! Frozen interface contracts shared by every scanner crate: telemetry samples,
//! fused records, footprint and polygon geometry, motion outputs, configuration
//! and the strategy traits for the external numeric kernels.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - One clock for all streams (seconds, f64): GPS, IMU and camera timestamps
//!   must come from the same source
//! - Angles are degrees at the ingestion boundary and radians everywhere after

mod config;
mod error;
mod fused;
mod geometry;
mod motion;
mod sample;

pub use config::*;
pub use error::*;
pub use fused::*;
pub use geometry::*;
pub use motion::*;
pub use sample::*;
