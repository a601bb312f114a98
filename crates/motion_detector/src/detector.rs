//! Ground-speed motion detector.

use contracts::{
    CameraConfig, ContractError, FlowField, FocalReference, FovFootprint, FusedImageRecord,
    MotionConfig, MotionDetection, OpticalFlow,
};
use image::{imageops, GrayImage, RgbImage};
use tracing::{debug, instrument};

use crate::{
    extraction::{extract_objects, SizeLimits},
    normalization::{focal_length, CameraPose, NormalizationField},
    speed::render_speed_image,
};

/// Detects moving objects by converting optical flow into metric ground speed
///
/// Holds the previous grayscale frame between calls; call [`Self::reset`]
/// whenever the camera moves between captures.
#[derive(Debug)]
pub struct GroundSpeedMotionDetector<F> {
    flow: F,
    camera: CameraConfig,
    motion: MotionConfig,
    focal_length: Option<f64>,
    previous: Option<GrayImage>,
}

impl<F: OpticalFlow> GroundSpeedMotionDetector<F> {
    /// Create a detector; an explicit `camera.image_width` fixes the focal length now
    pub fn new(camera: CameraConfig, motion: MotionConfig, flow: F) -> Self {
        let focal_length = camera
            .image_width
            .map(|width| focal_length(width, camera.horizontal_fov_deg));

        Self {
            flow,
            camera,
            motion,
            focal_length,
            previous: None,
        }
    }

    /// Derive the focal length for a frame `width` pixels wide
    pub fn set_focal_length(&mut self, width: u32) -> f64 {
        let f = focal_length(width, self.camera.horizontal_fov_deg);
        debug!(width, focal_length = f, "focal length set");
        self.focal_length = Some(f);
        f
    }

    pub fn focal_length(&self) -> Option<f64> {
        self.focal_length
    }

    /// Whether a previous frame is held
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Forget the previous frame so the next call bootstraps again
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Speed image and moving-object candidates for one fused frame
    ///
    /// The first call after construction or [`Self::reset`] only stores the
    /// frame and returns a black speed image with no objects.
    #[instrument(
        level = "debug",
        name = "motion_detect",
        skip_all,
        fields(t = record.t, primed = self.previous.is_some())
    )]
    pub fn detect(
        &mut self,
        record: &FusedImageRecord,
        footprint: &FovFootprint,
    ) -> Result<MotionDetection, ContractError> {
        let frame: &RgbImage = &record.image;
        let (width, height) = frame.dimensions();

        let focal = match self.focal_length {
            Some(f) => f,
            None => self.set_focal_length(match self.camera.focal_reference {
                FocalReference::Width => width,
                FocalReference::LegacyHeight => height,
            }),
        };

        let current = imageops::grayscale(frame);

        let Some(previous) = self.previous.take() else {
            debug!("first frame stored, no motion yet");
            self.previous = Some(current);
            return Ok(MotionDetection {
                speed_image: GrayImage::new(width, height),
                objects: Vec::new(),
                peak_speed: 0.0,
            });
        };

        if previous.dimensions() != current.dimensions() {
            let expected = previous.dimensions();
            self.previous = Some(current);
            return Err(ContractError::frame_size_mismatch(expected, (width, height)));
        }

        let flow: FlowField = self.flow.compute(&previous, &current);
        self.previous = Some(current);
        if flow.dimensions() != (width, height) {
            return Err(ContractError::flow_size_mismatch(
                (width, height),
                flow.dimensions(),
            ));
        }

        let pose = CameraPose {
            lat: record.lat,
            lng: record.lng,
            alt: record.alt,
        };
        let field = NormalizationField::build(footprint, pose, focal, width, height);
        let (speed_image, peak_speed) =
            render_speed_image(&flow, &field, self.motion.max_object_speed);

        let limits = SizeLimits::new(self.motion.object_size_low, self.motion.object_size_high);
        let objects = extract_objects(
            &speed_image,
            frame,
            self.motion.detection_threshold(),
            limits,
        );

        debug!(objects = objects.len(), peak_speed, "motion detected");
        metrics::histogram!("scanner_moving_objects").record(objects.len() as f64);

        Ok(MotionDetection {
            speed_image,
            objects,
            peak_speed,
        })
    }

    /// Get the optical flow strategy
    pub fn flow(&self) -> &F {
        &self.flow
    }

    /// Get motion configuration
    pub fn config(&self) -> &MotionConfig {
        &self.motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GeoPoint, LocationSample, ObjectKind, OrientationSample};
    use image::Rgb;
    use std::sync::Arc;

    /// Flow of `speed` pixels/frame inside a square, zero elsewhere
    struct SquareFlow {
        origin: (u32, u32),
        size: u32,
        speed: f32,
        calls: usize,
    }

    impl OpticalFlow for SquareFlow {
        fn compute(&mut self, _previous: &GrayImage, current: &GrayImage) -> FlowField {
            self.calls += 1;
            let (ox, oy) = self.origin;
            let (size, speed) = (self.size, self.speed);
            FlowField::from_fn(current.width(), current.height(), |x, y| {
                if x >= ox && x < ox + size && y >= oy && y < oy + size {
                    [speed, 0.0]
                } else {
                    [0.0, 0.0]
                }
            })
        }
    }

    struct WrongSizeFlow;

    impl OpticalFlow for WrongSizeFlow {
        fn compute(&mut self, _previous: &GrayImage, _current: &GrayImage) -> FlowField {
            FlowField::zeros(3, 3)
        }
    }

    fn square_flow(speed: f32) -> SquareFlow {
        SquareFlow {
            origin: (40, 40),
            size: 20,
            speed,
            calls: 0,
        }
    }

    fn record(width: u32, height: u32, shift: u32) -> FusedImageRecord {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([((x + shift) * 7 % 255) as u8, (y * 3 % 255) as u8, 0])
        });
        FusedImageRecord::new(
            Arc::new(image),
            LocationSample {
                lat: 0.0,
                lng: 3.0,
                alt: 100.0,
                t: 0.0,
            },
            OrientationSample::default(),
            shift as f64,
        )
    }

    fn footprint() -> FovFootprint {
        FovFootprint::new([
            GeoPoint::new(0.000_522_4, 3.0 - 0.000_518_8),
            GeoPoint::new(0.000_522_4, 3.0 + 0.000_518_8),
            GeoPoint::new(-0.000_522_4, 3.0 + 0.000_518_8),
            GeoPoint::new(-0.000_522_4, 3.0 - 0.000_518_8),
        ])
    }

    fn detector<F: OpticalFlow>(flow: F) -> GroundSpeedMotionDetector<F> {
        let motion = MotionConfig {
            max_object_speed: 30.0,
            min_detection_speed: 2.0,
            object_size_low: 0.0005,
            object_size_high: 0.3,
            ..Default::default()
        };
        GroundSpeedMotionDetector::new(CameraConfig::default(), motion, flow)
    }

    #[test]
    fn test_first_frame_bootstrap() {
        let mut detector = detector(square_flow(10.0));

        let result = detector.detect(&record(100, 80, 0), &footprint()).unwrap();
        assert!(result.objects.is_empty());
        assert_eq!(result.speed_image.dimensions(), (100, 80));
        assert!(result.speed_image.pixels().all(|p| p[0] == 0));
        assert_eq!(result.peak_speed, 0.0);
        assert_eq!(detector.flow().calls, 0);
        assert!(detector.is_primed());
    }

    #[test]
    fn test_second_frame_yields_speed_and_object() {
        let mut detector = detector(square_flow(10.0));
        detector.detect(&record(100, 100, 0), &footprint()).unwrap();

        let result = detector.detect(&record(100, 100, 1), &footprint()).unwrap();
        assert_eq!(detector.flow().calls, 1);
        assert!(result.speed_image.pixels().any(|p| p[0] > 0));

        // 10 px at ~1.155 m/px is ~11.5 m per frame
        assert!((result.peak_speed - 11.55).abs() < 0.2, "{}", result.peak_speed);
        let centre = result.speed_image.get_pixel(50, 50)[0];
        assert!((95..=100).contains(&centre), "{centre}");

        assert_eq!(result.objects.len(), 1);
        let object = &result.objects[0];
        assert_eq!(object.kind, ObjectKind::Moving);
        assert_eq!((object.bbox.x, object.bbox.y), (40, 40));
        assert_eq!((object.bbox.width, object.bbox.height), (20, 20));
    }

    #[test]
    fn test_fast_object_saturates() {
        let mut detector = detector(square_flow(100.0));
        detector.detect(&record(100, 100, 0), &footprint()).unwrap();

        let result = detector.detect(&record(100, 100, 1), &footprint()).unwrap();
        assert_eq!(result.speed_image.get_pixel(50, 50)[0], 255);
        assert_eq!(result.speed_image.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn test_focal_length_derivation_modes() {
        let mut lazy = detector(square_flow(1.0));
        lazy.detect(&record(100, 80, 0), &footprint()).unwrap();
        assert!((lazy.focal_length().unwrap() - 86.602_540_378).abs() < 1e-6);

        let legacy_camera = CameraConfig {
            focal_reference: FocalReference::LegacyHeight,
            ..Default::default()
        };
        let mut legacy =
            GroundSpeedMotionDetector::new(legacy_camera, MotionConfig::default(), square_flow(1.0));
        legacy.detect(&record(100, 80, 0), &footprint()).unwrap();
        assert!((legacy.focal_length().unwrap() - 69.282_032_303).abs() < 1e-6);

        let explicit_camera = CameraConfig {
            image_width: Some(200),
            ..Default::default()
        };
        let explicit =
            GroundSpeedMotionDetector::new(explicit_camera, MotionConfig::default(), square_flow(1.0));
        assert!((explicit.focal_length().unwrap() - 173.205_080_757).abs() < 1e-6);
    }

    #[test]
    fn test_reset_bootstraps_again() {
        let mut detector = detector(square_flow(10.0));
        detector.detect(&record(100, 100, 0), &footprint()).unwrap();
        detector.reset();
        assert!(!detector.is_primed());

        let result = detector.detect(&record(100, 100, 1), &footprint()).unwrap();
        assert!(result.objects.is_empty());
        assert_eq!(detector.flow().calls, 0);
    }

    #[test]
    fn test_frame_size_change_is_an_error() {
        let mut detector = detector(square_flow(10.0));
        detector.detect(&record(100, 100, 0), &footprint()).unwrap();

        let err = detector.detect(&record(80, 60, 1), &footprint()).unwrap_err();
        assert!(matches!(err, ContractError::FrameSizeMismatch { .. }));
    }

    #[test]
    fn test_flow_size_mismatch_is_an_error() {
        let mut detector = detector(WrongSizeFlow);
        detector.detect(&record(10, 10, 0), &footprint()).unwrap();

        let err = detector.detect(&record(10, 10, 1), &footprint()).unwrap_err();
        assert!(matches!(err, ContractError::FlowSizeMismatch { .. }));
    }
}
