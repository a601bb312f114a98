//! Per-pixel coefficients converting optical-flow displacement to ground metres.

use std::f64::consts::FRAC_PI_2;

use contracts::FovFootprint;
use nalgebra::Vector2;

use crate::geodesy::UtmProjection;

/// Pinhole focal length (pixels) for a horizontal view angle spanning `width` pixels
///
/// Assumes the optical centre sits on the image centre.
pub fn focal_length(width: u32, horizontal_fov_deg: f64) -> f64 {
    0.5 * width as f64 / (horizontal_fov_deg / 2.0).to_radians().tan()
}

/// Camera position the field is built for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub lat: f64,
    pub lng: f64,
    /// Altitude above ground (metres)
    pub alt: f64,
}

/// Horizontal and vertical metres-per-pixel for one frame
///
/// Valid only for the footprint, pose and focal length it was built from.
#[derive(Debug, Clone)]
pub struct NormalizationField {
    width: u32,
    height: u32,
    horizontal: Vec<f64>,
    vertical: Vec<f64>,
    skew: f64,
}

impl NormalizationField {
    /// Build the field for a `width x height` frame
    ///
    /// Ground positions are interpolated from the footprint corners (rows run
    /// from edge 0-1 to edge 3-2) in the camera's UTM zone.
    pub fn build(
        footprint: &FovFootprint,
        pose: CameraPose,
        focal_length: f64,
        width: u32,
        height: u32,
    ) -> Self {
        let projection = UtmProjection::for_origin(pose.lat, pose.lng);
        let camera = projection.project(pose.lat, pose.lng);
        let corners: [Vector2<f64>; 4] = footprint
            .corners
            .map(|corner| projection.project(corner.lat, corner.lng));

        let skew = corner_skew(&corners);

        let rows = height as f64;
        let cols = width as f64;
        let half_cols = cols / 2.0;
        let half_rows = rows / 2.0;
        let focal_sq = focal_length * focal_length;
        let alt_sq = pose.alt * pose.alt;

        let len = width as usize * height as usize;
        let mut horizontal = Vec::with_capacity(len);
        let mut vertical = Vec::with_capacity(len);

        for i in 0..height {
            let fi = i as f64;
            let row_first = corners[0] + (corners[3] - corners[0]) * (fi / rows);
            let row_last = corners[1] + (corners[2] - corners[1]) * (fi / rows);
            let row_step = (row_last - row_first) / cols;

            for j in 0..width {
                let fj = j as f64;
                let ground = row_first + row_step * fj;

                let optical = ((fj - half_cols).powi(2) + (fi - half_rows).powi(2) + focal_sq).sqrt();
                let slant = ((camera - ground).norm_squared() + alt_sq).sqrt();
                let coeff = slant / optical;

                let column_offset = (fj - half_cols) / half_cols;
                horizontal.push(coeff);
                vertical.push(coeff / (column_offset * skew).cos());
            }
        }

        Self {
            width,
            height,
            horizontal,
            vertical,
            skew,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `(horizontal, vertical)` coefficients at pixel `(x, y)`
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> (f64, f64) {
        let idx = y as usize * self.width as usize + x as usize;
        (self.horizontal[idx], self.vertical[idx])
    }

    /// Row-major horizontal coefficients
    pub fn horizontal(&self) -> &[f64] {
        &self.horizontal
    }

    /// Row-major vertical coefficients
    pub fn vertical(&self) -> &[f64] {
        &self.vertical
    }

    /// Deviation from a right angle at corner 1 (radians)
    pub fn skew(&self) -> f64 {
        self.skew
    }
}

/// `pi/2` minus the angle between edges 1->0 and 1->2; zero for a rectangle
fn corner_skew(corners: &[Vector2<f64>; 4]) -> f64 {
    let v1 = corners[0] - corners[1];
    let v2 = corners[2] - corners[1];
    let norms = v1.norm() * v2.norm();
    if norms == 0.0 {
        return 0.0;
    }
    let cos = (v1.dot(&v2) / norms).clamp(-1.0, 1.0);
    FRAC_PI_2 - cos.acos()
}
