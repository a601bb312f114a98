//! # Sensor Sync
//!
//! Nearest-time fusion of asynchronous telemetry with camera frames.
//!
//! Responsibilities:
//! - Bounded FIFO buffers per telemetry stream
//! - Degree to radian conversion of orientation samples
//! - Reference origin from the first location sample
//! - `FusedImageRecord` / `FusedImuRecord` output
//!
//! ## Usage
//!
//! ```ignore
//! use sensor_sync::{SensorSync, SensorSyncConfig};
//!
//! let mut sync = SensorSync::new(SensorSyncConfig::default());
//!
//! sync.ingest_location(47.61, 8.54, 120.0, 0.95);
//! sync.ingest_orientation(1.5, -2.0, 87.0, 0.98);
//! sync.set_frame(frame, 1.0);
//!
//! if let Some(record) = sync.fuse_image() {
//!     // Hand the record to the motion detector
//! }
//! ```

mod buffer;
mod engine;
mod shared;

pub use buffer::SampleBuffer;
pub use engine::SensorSync;
pub use shared::SharedSensorSync;

// Re-export contracts types
pub use contracts::{
    BufferStats, FusedImageRecord, FusedImuRecord, LocationSample, OrientationSample,
    SensorSyncConfig,
};
