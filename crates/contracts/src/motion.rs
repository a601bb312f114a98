//! Motion detection contracts
//!
//! Displacement fields, moving-object candidates and the strategy traits for
//! the optical-flow and object-detection collaborators.

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Dense per-pixel displacement between two frames (pixels)
///
/// Row-major, one `[dx, dy]` per pixel. The displacement at `(x, y)` maps a
/// point of the previous frame to `(x + dx, y + dy)` in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    width: u32,
    height: u32,
    vectors: Vec<[f32; 2]>,
}

impl FlowField {
    /// Field of zero displacement
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            vectors: vec![[0.0, 0.0]; width as usize * height as usize],
        }
    }

    /// Build a field from a per-pixel function
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [f32; 2]) -> Self {
        let mut vectors = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                vectors.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            vectors,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Displacement at pixel `(x, y)`
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [f32; 2] {
        self.vectors[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: [f32; 2]) {
        let idx = y as usize * self.width as usize + x as usize;
        self.vectors[idx] = value;
    }

    /// Row-major vectors
    pub fn as_slice(&self) -> &[[f32; 2]] {
        &self.vectors
    }
}

/// Dense optical-flow capability: `(previous, current) -> displacement field`
///
/// The returned field must have the resolution of the input frames.
pub trait OpticalFlow {
    fn compute(&mut self, previous: &GrayImage, current: &GrayImage) -> FlowField;
}

impl<F: OpticalFlow + ?Sized> OpticalFlow for Box<F> {
    fn compute(&mut self, previous: &GrayImage, current: &GrayImage) -> FlowField {
        (**self).compute(previous, current)
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Clamp to an image of `width x height`; `None` when nothing remains
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, w, h))
    }
}

/// How an object candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Region of ground speed above the detection threshold
    Moving,
    /// Box reported by the object-detection network
    Detected,
}

/// Object candidate with its image crop. Produced per frame, never retained.
#[derive(Debug, Clone)]
pub struct MovingObject {
    pub bbox: BoundingBox,
    pub crop: RgbImage,
    pub kind: ObjectKind,
}

/// Output of one motion detection pass
#[derive(Debug, Clone)]
pub struct MotionDetection {
    /// Clipped ground speed rescaled to 0..=255
    pub speed_image: GrayImage,

    /// Candidate moving objects
    pub objects: Vec<MovingObject>,

    /// Highest metric speed before clipping (0 on bootstrap)
    pub peak_speed: f64,
}

/// Box reported by an object detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedBox {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// Object-detection network capability: `image -> boxes with confidence`
pub trait ObjectDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<DetectedBox>, ContractError>;
}
