//! Moving-region extraction from a speed image.

use contracts::{BoundingBox, MovingObject, ObjectKind};
use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::{contours::find_contours, point::Point};

/// Region size limits as fractions of the image area (both exclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeLimits {
    pub low: f64,
    pub high: f64,
}

impl SizeLimits {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn accepts(&self, ratio: f64) -> bool {
        ratio > self.low && ratio < self.high
    }
}

/// Binary mask of pixels strictly brighter than `threshold`
pub fn threshold_mask(speed: &GrayImage, threshold: f64) -> GrayImage {
    GrayImage::from_fn(speed.width(), speed.height(), |x, y| {
        if f64::from(speed.get_pixel(x, y)[0]) > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Contour-bounded regions of the thresholded speed image whose area ratio
/// passes `limits`, each cropped out of `frame`
///
/// Every border is considered, outer and hole alike.
pub fn extract_objects(
    speed: &GrayImage,
    frame: &RgbImage,
    threshold: f64,
    limits: SizeLimits,
) -> Vec<MovingObject> {
    let mask = threshold_mask(speed, threshold);
    let image_area = f64::from(speed.width()) * f64::from(speed.height());
    if image_area == 0.0 {
        return Vec::new();
    }

    find_contours::<i32>(&mask)
        .into_iter()
        .filter(|contour| limits.accepts(contour_area(&contour.points) / image_area))
        .filter_map(|contour| bounding_rect(&contour.points))
        .filter_map(|bbox| bbox.clamp_to(frame.width(), frame.height()))
        .map(|bbox| MovingObject {
            crop: crop(frame, bbox),
            bbox,
            kind: ObjectKind::Moving,
        })
        .collect()
}

/// Shoelace area enclosed by contour points (pixel centres)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// Smallest pixel rectangle containing every point
pub fn bounding_rect(points: &[Point<i32>]) -> Option<BoundingBox> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;

    if min_x < 0 || min_y < 0 {
        return None;
    }
    Some(BoundingBox::new(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

pub(crate) fn crop(frame: &RgbImage, bbox: BoundingBox) -> RgbImage {
    imageops::crop_imm(frame, bbox.x, bbox.y, bbox.width, bbox.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const LIMITS: SizeLimits = SizeLimits {
        low: 0.01,
        high: 0.3,
    };

    fn speed_with_blob(x: u32, y: u32, size: u32) -> GrayImage {
        let mut image = GrayImage::new(100, 100);
        for yy in y..y + size {
            for xx in x..x + size {
                image.put_pixel(xx, yy, Luma([200]));
            }
        }
        image
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut speed = GrayImage::new(2, 1);
        speed.put_pixel(0, 0, Luma([10]));
        speed.put_pixel(1, 0, Luma([11]));

        let mask = threshold_mask(&speed, 10.0);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_tiny_blob_rejected() {
        // 3x3 pixels, contour area 4 / 10000
        let speed = speed_with_blob(10, 10, 3);
        let frame = RgbImage::new(100, 100);
        assert!(extract_objects(&speed, &frame, 50.0, LIMITS).is_empty());
    }

    #[test]
    fn test_half_frame_blob_rejected() {
        // 71x71 pixels, contour area 4900 / 10000
        let speed = speed_with_blob(10, 10, 71);
        let frame = RgbImage::new(100, 100);
        assert!(extract_objects(&speed, &frame, 50.0, LIMITS).is_empty());
    }

    #[test]
    fn test_mid_size_blob_extracted_with_crop() {
        // 23x23 pixels, contour area 484 / 10000
        let speed = speed_with_blob(40, 30, 23);
        let mut frame = RgbImage::new(100, 100);
        frame.put_pixel(40, 30, Rgb([9, 8, 7]));

        let objects = extract_objects(&speed, &frame, 50.0, LIMITS);
        assert_eq!(objects.len(), 1);

        let object = &objects[0];
        assert_eq!(object.kind, ObjectKind::Moving);
        assert_eq!(object.bbox, BoundingBox::new(40, 30, 23, 23));
        assert_eq!(object.crop.dimensions(), (23, 23));
        assert_eq!(object.crop.get_pixel(0, 0), &Rgb([9, 8, 7]));
    }

    #[test]
    fn test_mixed_blobs_keep_only_mid_size() {
        let mut speed = speed_with_blob(60, 60, 23);
        for yy in 2..5 {
            for xx in 2..5 {
                speed.put_pixel(xx, yy, Luma([255]));
            }
        }
        let frame = RgbImage::new(100, 100);

        let objects = extract_objects(&speed, &frame, 50.0, LIMITS);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].bbox.x, 60);
    }

    #[test]
    fn test_below_threshold_blob_ignored() {
        let speed = speed_with_blob(40, 30, 23);
        let frame = RgbImage::new(100, 100);
        assert!(extract_objects(&speed, &frame, 200.0, LIMITS).is_empty());
    }

    #[test]
    fn test_contour_area_square() {
        let points = vec![
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(4, 4),
            Point::new(0, 4),
        ];
        assert_eq!(contour_area(&points), 16.0);
        assert_eq!(bounding_rect(&points), Some(BoundingBox::new(0, 0, 5, 5)));
    }
}
