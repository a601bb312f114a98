//! Telemetry samples and camera frames - Ingestion output
//!
//! Raw position/orientation samples and the frame they are fused with.

use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Anything carrying a capture time on the shared clock.
pub trait Timestamped {
    /// Capture time (seconds)
    fn timestamp(&self) -> f64;
}

/// Telemetry stream kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Location,
    Orientation,
}

impl SampleKind {
    /// Metric label / log field value
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Orientation => "orientation",
        }
    }
}

/// GPS sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Latitude (degrees)
    pub lat: f64,

    /// Longitude (degrees)
    pub lng: f64,

    /// Altitude above ground (metres)
    pub alt: f64,

    /// Capture time (seconds)
    pub t: f64,
}

impl Timestamped for LocationSample {
    fn timestamp(&self) -> f64 {
        self.t
    }
}

/// IMU attitude sample, radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub roll: f64,
    pub pitch: f64,
    pub azimuth: f64,

    /// Capture time (seconds)
    pub t: f64,
}

impl OrientationSample {
    /// Build a sample from degree readings
    pub fn from_degrees(roll_deg: f64, pitch_deg: f64, azimuth_deg: f64, t: f64) -> Self {
        Self {
            roll: roll_deg.to_radians(),
            pitch: pitch_deg.to_radians(),
            azimuth: azimuth_deg.to_radians(),
            t,
        }
    }
}

impl Timestamped for OrientationSample {
    fn timestamp(&self) -> f64 {
        self.t
    }
}

/// Camera frame with its capture time
///
/// The pixels are shared so fused records can hand the frame on without copying.
#[derive(Debug, Clone)]
pub struct ImageFrame {
    pub image: Arc<RgbImage>,
    pub t: f64,
}

impl ImageFrame {
    pub fn new(image: RgbImage, t: f64) -> Self {
        Self {
            image: Arc::new(image),
            t,
        }
    }

    /// `(width, height)` in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl Timestamped for ImageFrame {
    fn timestamp(&self) -> f64 {
        self.t
    }
}
