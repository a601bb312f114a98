//! Reference dense optical flow by exhaustive block matching.
//!
//! Coarse but dependency-free: one displacement per block, found by minimising
//! the sum of absolute differences inside a square search window. A real
//! deployment injects a sub-pixel dense method through [`OpticalFlow`].

use contracts::{FlowConfig, FlowField, OpticalFlow};
use image::GrayImage;

/// SAD block matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMatchingFlow {
    block_size: u32,
    search_radius: u32,
}

impl BlockMatchingFlow {
    pub fn new(block_size: u32, search_radius: u32) -> Self {
        Self {
            block_size: block_size.max(1),
            search_radius,
        }
    }

    pub fn from_config(config: &FlowConfig) -> Self {
        Self::new(config.block_size, config.search_radius)
    }

    /// Displacement of the block at `(x0, y0)` of size `w x h`
    fn match_block(
        &self,
        previous: &GrayImage,
        current: &GrayImage,
        (x0, y0): (u32, u32),
        (w, h): (u32, u32),
    ) -> [f32; 2] {
        let (width, height) = current.dimensions();
        let radius = self.search_radius as i64;

        // Zero displacement wins ties so static texture stays still
        let mut best = [0i64, 0i64];
        let mut best_sad = sad(previous, current, (x0, y0), (x0, y0), (w, h));

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let cx = x0 as i64 + dx;
                let cy = y0 as i64 + dy;
                if cx < 0 || cy < 0 || cx + w as i64 > width as i64 || cy + h as i64 > height as i64 {
                    continue;
                }

                let score = sad(previous, current, (x0, y0), (cx as u32, cy as u32), (w, h));
                if score < best_sad {
                    best_sad = score;
                    best = [dx, dy];
                }
            }
        }

        [best[0] as f32, best[1] as f32]
    }
}

impl Default for BlockMatchingFlow {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

impl OpticalFlow for BlockMatchingFlow {
    fn compute(&mut self, previous: &GrayImage, current: &GrayImage) -> FlowField {
        let (width, height) = current.dimensions();
        let mut field = FlowField::zeros(width, height);
        if previous.dimensions() != current.dimensions() {
            return field;
        }

        let step = self.block_size;
        for y0 in (0..height).step_by(step as usize) {
            for x0 in (0..width).step_by(step as usize) {
                let w = step.min(width - x0);
                let h = step.min(height - y0);
                let vector = self.match_block(previous, current, (x0, y0), (w, h));

                for y in y0..y0 + h {
                    for x in x0..x0 + w {
                        field.set(x, y, vector);
                    }
                }
            }
        }

        field
    }
}

fn sad(a: &GrayImage, b: &GrayImage, (ax, ay): (u32, u32), (bx, by): (u32, u32), (w, h): (u32, u32)) -> u64 {
    let mut total = 0u64;
    for y in 0..h {
        for x in 0..w {
            let pa = a.get_pixel(ax + x, ay + y)[0];
            let pb = b.get_pixel(bx + x, by + y)[0];
            total += pa.abs_diff(pb) as u64;
        }
    }
    total
}
