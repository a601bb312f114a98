//! Annotated frame buffers for an external display layer.

use contracts::{ContractError, DetectedBox, MovingObject, ObjectDetector, ObjectKind};
use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::extraction::crop;

const MOVING_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const DETECTED_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Copy of `frame` with every object's bounding box outlined
pub fn annotate_objects(frame: &RgbImage, objects: &[MovingObject]) -> RgbImage {
    let mut canvas = frame.clone();
    for object in objects {
        let color = match object.kind {
            ObjectKind::Moving => MOVING_COLOR,
            ObjectKind::Detected => DETECTED_COLOR,
        };
        let rect = Rect::at(object.bbox.x as i32, object.bbox.y as i32)
            .of_size(object.bbox.width.max(1), object.bbox.height.max(1));
        draw_hollow_rect_mut(&mut canvas, rect, color);
    }
    canvas
}

/// Objects for detector boxes at or above `min_confidence`
///
/// Boxes are clamped to the frame; boxes entirely outside it are dropped.
pub fn detected_objects(
    frame: &RgbImage,
    boxes: &[DetectedBox],
    min_confidence: f32,
) -> Vec<MovingObject> {
    boxes
        .iter()
        .filter(|detected| detected.confidence >= min_confidence)
        .filter_map(|detected| detected.bbox.clamp_to(frame.width(), frame.height()))
        .map(|bbox| MovingObject {
            crop: crop(frame, bbox),
            bbox,
            kind: ObjectKind::Detected,
        })
        .collect()
}

/// Run a detector over `frame` and convert its boxes
pub fn run_detector<D: ObjectDetector + ?Sized>(
    detector: &mut D,
    frame: &RgbImage,
    min_confidence: f32,
) -> Result<Vec<MovingObject>, ContractError> {
    let boxes = detector.detect(frame)?;
    Ok(detected_objects(frame, &boxes, min_confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::BoundingBox;

    struct FixedDetector(Vec<DetectedBox>);

    impl ObjectDetector for FixedDetector {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<DetectedBox>, ContractError> {
            Ok(self.0.clone())
        }
    }

    fn moving(x: u32, y: u32, w: u32, h: u32) -> MovingObject {
        MovingObject {
            bbox: BoundingBox::new(x, y, w, h),
            crop: RgbImage::new(w, h),
            kind: ObjectKind::Moving,
        }
    }

    #[test]
    fn test_annotate_draws_outline_only() {
        let frame = RgbImage::new(20, 20);
        let annotated = annotate_objects(&frame, &[moving(5, 5, 6, 6)]);

        assert_eq!(annotated.get_pixel(5, 5), &MOVING_COLOR);
        assert_eq!(annotated.get_pixel(10, 10), &MOVING_COLOR);
        assert_eq!(annotated.get_pixel(7, 7), &Rgb([0, 0, 0]));
        // Source frame untouched
        assert_eq!(frame.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_detected_objects_filter_and_clamp() {
        let frame = RgbImage::new(50, 40);
        let boxes = vec![
            DetectedBox {
                bbox: BoundingBox::new(40, 30, 20, 20),
                confidence: 0.9,
            },
            DetectedBox {
                bbox: BoundingBox::new(0, 0, 10, 10),
                confidence: 0.2,
            },
            DetectedBox {
                bbox: BoundingBox::new(60, 0, 10, 10),
                confidence: 0.95,
            },
        ];

        let objects = detected_objects(&frame, &boxes, 0.5);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].bbox, BoundingBox::new(40, 30, 10, 10));
        assert_eq!(objects[0].kind, ObjectKind::Detected);
        assert_eq!(objects[0].crop.dimensions(), (10, 10));
    }

    #[test]
    fn test_run_detector() {
        let mut detector = FixedDetector(vec![DetectedBox {
            bbox: BoundingBox::new(1, 1, 4, 4),
            confidence: 0.7,
        }]);
        let frame = RgbImage::new(10, 10);

        let objects = run_detector(&mut detector, &frame, 0.5).unwrap();
        assert_eq!(objects.len(), 1);
        let annotated = annotate_objects(&frame, &objects);
        assert_eq!(annotated.get_pixel(1, 1), &DETECTED_COLOR);
    }
}
