//! Session file records and replayed events

use std::path::PathBuf;

use contracts::{FovFootprint, GeoPoint, LocationSample};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One line of `session.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionRecord {
    /// GPS fix
    Location { lat: f64, lng: f64, alt: f64, t: f64 },

    /// IMU attitude, degrees
    Orientation {
        roll: f64,
        pitch: f64,
        azimuth: f64,
        t: f64,
    },

    /// Camera frame with its ground footprint
    Frame {
        t: f64,
        /// Image path relative to the session directory
        image: PathBuf,
        /// Corners: top-left, top-right, bottom-right, bottom-left
        fov: [GeoPoint; 4],
    },
}

impl SessionRecord {
    /// Capture time (seconds)
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::Location { t, .. } | Self::Orientation { t, .. } | Self::Frame { t, .. } => *t,
        }
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Self::Frame { .. })
    }
}

/// Event delivered by a running replay, frames decoded
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Location(LocationSample),

    /// IMU attitude, degrees as recorded
    Orientation {
        roll_deg: f64,
        pitch_deg: f64,
        azimuth_deg: f64,
        t: f64,
    },

    Frame {
        image: RgbImage,
        t: f64,
        footprint: FovFootprint,
    },
}

impl SessionEvent {
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::Location(sample) => sample.t,
            Self::Orientation { t, .. } | Self::Frame { t, .. } => *t,
        }
    }
}
