//! ScannerConfig - Config Loader output
//!
//! Camera calibration, telemetry buffering, motion detection thresholds and
//! coverage tracking policy.

use serde::{Deserialize, Serialize};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete scanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Camera calibration
    #[serde(default)]
    pub camera: CameraConfig,

    /// Telemetry buffering
    #[serde(default)]
    pub sensor_sync: SensorSyncConfig,

    /// Motion detection
    #[serde(default)]
    pub motion: MotionConfig,

    /// Coverage tracking
    #[serde(default)]
    pub coverage: CoverageConfig,
}

/// Pinhole camera calibration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Horizontal view angle (degrees)
    #[serde(default = "default_horizontal_fov")]
    pub horizontal_fov_deg: f64,

    /// Calibrated image width (pixels); derived from the first frame when absent
    #[serde(default)]
    pub image_width: Option<u32>,

    /// Calibrated image height (pixels)
    #[serde(default)]
    pub image_height: Option<u32>,

    /// Frame dimension used when the focal length is derived lazily
    #[serde(default)]
    pub focal_reference: FocalReference,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            horizontal_fov_deg: default_horizontal_fov(),
            image_width: None,
            image_height: None,
            focal_reference: FocalReference::default(),
        }
    }
}

fn default_horizontal_fov() -> f64 {
    60.0
}

/// Frame dimension fed to the focal length derivation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocalReference {
    /// Frame width, consistent with a horizontal view angle
    #[default]
    Width,
    /// Frame height passed as the width, bit-compatible with older recordings
    LegacyHeight,
}

/// Telemetry ring buffer capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSyncConfig {
    /// Location buffer capacity
    pub location_buffer_len: usize,
    /// Orientation buffer capacity
    pub orientation_buffer_len: usize,
}

impl Default for SensorSyncConfig {
    fn default() -> Self {
        Self {
            location_buffer_len: 50,
            orientation_buffer_len: 50,
        }
    }
}

/// Motion detection thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Speed mapped to full intensity; faster pixels are clipped
    #[serde(default = "default_max_object_speed")]
    pub max_object_speed: f64,

    /// Speed a pixel must exceed to belong to a moving region
    #[serde(default = "default_min_detection_speed")]
    pub min_detection_speed: f64,

    /// Smallest region, as a fraction of the image area (exclusive)
    #[serde(default = "default_object_size_low")]
    pub object_size_low: f64,

    /// Largest region, as a fraction of the image area (exclusive)
    #[serde(default = "default_object_size_high")]
    pub object_size_high: f64,

    /// Reference optical flow tuning
    #[serde(default)]
    pub flow: FlowConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_object_speed: default_max_object_speed(),
            min_detection_speed: default_min_detection_speed(),
            object_size_low: default_object_size_low(),
            object_size_high: default_object_size_high(),
            flow: FlowConfig::default(),
        }
    }
}

impl MotionConfig {
    /// `min_detection_speed` on the 0..=255 speed-image scale
    pub fn detection_threshold(&self) -> f64 {
        (self.min_detection_speed.min(self.max_object_speed) / self.max_object_speed) * 255.0
    }
}

fn default_max_object_speed() -> f64 {
    30.0
}

fn default_min_detection_speed() -> f64 {
    2.0
}

fn default_object_size_low() -> f64 {
    0.0005
}

fn default_object_size_high() -> f64 {
    0.3
}

/// Block-matching optical flow parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Block edge (pixels)
    pub block_size: u32,
    /// Maximum displacement searched in each direction (pixels)
    pub search_radius: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            block_size: 8,
            search_radius: 4,
        }
    }
}

/// Coverage tracking policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Vertices closer than this (coordinate units) to an earlier vertex are welded
    #[serde(default = "default_weld_epsilon")]
    pub weld_epsilon: f64,

    /// How disjoint union components are handled
    #[serde(default)]
    pub mode: CoverageMode,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            weld_epsilon: default_weld_epsilon(),
            mode: CoverageMode::default(),
        }
    }
}

fn default_weld_epsilon() -> f64 {
    0.00002
}

/// Coverage representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageMode {
    /// One polygon; disjoint union components beyond the first are dropped
    #[default]
    Legacy,
    /// A set of disjoint regions; nothing surveyed is dropped
    MultiRegion,
}
