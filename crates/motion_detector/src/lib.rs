//! # Motion Detector
//!
//! Converts dense optical flow between consecutive frames into metric ground
//! speed and extracts moving-object candidates.
//!
//! Pipeline per frame:
//! 1. Grayscale conversion, optical flow against the previous frame
//! 2. Normalization coefficient field from the FOV footprint, camera position
//!    (UTM) and pinhole focal length
//! 3. Metric speed magnitude, clipped and rescaled to a 0..=255 speed image
//! 4. Threshold, contour extraction and size filtering
//!
//! ## Usage
//!
//! ```ignore
//! use motion_detector::{BlockMatchingFlow, GroundSpeedMotionDetector};
//!
//! let flow = BlockMatchingFlow::from_config(&config.motion.flow);
//! let mut detector = GroundSpeedMotionDetector::new(config.camera, config.motion, flow);
//!
//! let detection = detector.detect(&record, &footprint)?;
//! for object in &detection.objects {
//!     // Hand crops to the display layer
//! }
//! ```
//!
//! ## Detection network
//!
//! The CLI only uses motion candidates. An embedding application that owns a
//! detection network implements [`ObjectDetector`] and feeds its boxes through
//! [`run_detector`] (or [`detected_objects`] for precomputed boxes); the
//! resulting objects can be drawn with [`annotate_objects`] alongside the
//! moving ones.

mod annotate;
mod detector;
mod extraction;
mod flow;
mod geodesy;
mod normalization;
mod speed;

pub use annotate::{annotate_objects, detected_objects, run_detector};
pub use detector::GroundSpeedMotionDetector;
pub use extraction::{bounding_rect, contour_area, extract_objects, threshold_mask, SizeLimits};
pub use flow::BlockMatchingFlow;
pub use geodesy::{central_meridian, to_utm, utm_zone, UtmProjection};
pub use normalization::{focal_length, CameraPose, NormalizationField};
pub use speed::{render_speed_image, speed_to_intensity};

// Re-export contracts types
pub use contracts::{
    FlowField, MotionConfig, MotionDetection, MovingObject, ObjectDetector, ObjectKind,
    OpticalFlow,
};
