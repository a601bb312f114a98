//! Metric speed image: flow x coefficients, clipped and rescaled to 0..=255.

use contracts::FlowField;
use image::{GrayImage, Luma};

use crate::normalization::NormalizationField;

/// Map a metric speed onto the visual intensity scale
///
/// Speeds at or above `max_speed` saturate at 255; zero maps to 0.
#[inline]
pub fn speed_to_intensity(speed: f64, max_speed: f64) -> u8 {
    let clipped = speed.clamp(0.0, max_speed);
    (clipped * 255.0 / max_speed).round() as u8
}

/// Speed image plus the largest unclipped speed
///
/// Flow and field must share dimensions.
pub fn render_speed_image(
    flow: &FlowField,
    field: &NormalizationField,
    max_speed: f64,
) -> (GrayImage, f64) {
    let (width, height) = flow.dimensions();
    let mut peak = 0.0f64;

    let image = GrayImage::from_fn(width, height, |x, y| {
        let [dx, dy] = flow.get(x, y);
        let (cx, cy) = field.get(x, y);
        let speed = (dx as f64 * cx).hypot(dy as f64 * cy);
        peak = peak.max(speed);
        Luma([speed_to_intensity(speed, max_speed)])
    });

    (image, peak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::CameraPose;
    use contracts::{FovFootprint, GeoPoint};

    #[test]
    fn test_zero_speed_is_black() {
        assert_eq!(speed_to_intensity(0.0, 30.0), 0);
    }

    #[test]
    fn test_speed_above_max_saturates() {
        assert_eq!(speed_to_intensity(30.0, 30.0), 255);
        assert_eq!(speed_to_intensity(1000.0, 30.0), 255);
    }

    #[test]
    fn test_speed_scales_linearly() {
        assert_eq!(speed_to_intensity(15.0, 30.0), 128);
        assert_eq!(speed_to_intensity(3.0, 30.0), 26);
    }

    #[test]
    fn test_render_uses_both_channels() {
        let footprint = FovFootprint::new([
            GeoPoint::new(0.0005, 2.9995),
            GeoPoint::new(0.0005, 3.0005),
            GeoPoint::new(-0.0005, 3.0005),
            GeoPoint::new(-0.0005, 2.9995),
        ]);
        let pose = CameraPose {
            lat: 0.0,
            lng: 3.0,
            alt: 100.0,
        };
        let field = NormalizationField::build(&footprint, pose, 86.6, 10, 10);
        let flow = FlowField::from_fn(10, 10, |x, _| if x == 5 { [3.0, 4.0] } else { [0.0, 0.0] });

        let (image, peak) = render_speed_image(&flow, &field, 1000.0);
        let (cx, _) = field.get(5, 5);

        assert_eq!(image.get_pixel(0, 5)[0], 0);
        assert!(image.get_pixel(5, 5)[0] > 0);
        // |(3, 4)| = 5 pixels at column 5
        assert!(peak >= 5.0 * cx * 0.99);
    }
}
