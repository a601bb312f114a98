//! Fused records - SensorSync output
//!
//! A frame or orientation event paired with the nearest-in-time telemetry.

use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::{LocationSample, OrientationSample, SampleKind};

/// Frame fused with the nearest location and orientation samples
///
/// Immutable once produced. Fields of a stream whose buffer was empty at
/// fusion time are zero; check the buffers before trusting them.
#[derive(Debug, Clone)]
pub struct FusedImageRecord {
    pub image: Arc<RgbImage>,

    /// Latitude (degrees)
    pub lat: f64,

    /// Longitude (degrees)
    pub lng: f64,

    /// Altitude (metres)
    pub alt: f64,

    /// Roll (radians)
    pub roll: f64,

    /// Pitch (radians)
    pub pitch: f64,

    /// Azimuth (radians)
    pub azimuth: f64,

    /// Frame capture time (seconds)
    pub t: f64,
}

impl FusedImageRecord {
    pub fn new(
        image: Arc<RgbImage>,
        location: LocationSample,
        orientation: OrientationSample,
        t: f64,
    ) -> Self {
        Self {
            image,
            lat: location.lat,
            lng: location.lng,
            alt: location.alt,
            roll: orientation.roll,
            pitch: orientation.pitch,
            azimuth: orientation.azimuth,
            t,
        }
    }

    /// `(width, height)` of the fused frame
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Latest orientation sample fused with the nearest location sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedImuRecord {
    pub roll: f64,
    pub pitch: f64,
    pub azimuth: f64,
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,

    /// Orientation sample time (seconds)
    pub t: f64,
}

impl FusedImuRecord {
    pub fn new(orientation: OrientationSample, location: LocationSample) -> Self {
        Self {
            roll: orientation.roll,
            pitch: orientation.pitch,
            azimuth: orientation.azimuth,
            lat: location.lat,
            lng: location.lng,
            alt: location.alt,
            t: orientation.t,
        }
    }
}

/// Per-stream buffer status (for diagnostics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferStats {
    pub kind: SampleKind,

    /// Samples currently held
    pub len: usize,

    /// Configured capacity
    pub capacity: usize,

    /// Samples evicted by FIFO overwrite
    pub evicted: u64,

    /// Samples that arrived earlier than their predecessor
    pub out_of_order: u64,
}
