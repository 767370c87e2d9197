use crate::media::coordinate_cell::CoordinateCell;
use ballsync_core::{BYTES_PER_PIXEL, CoordinatePair, Frame};

/// Connected foreground region found in a binarized frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub area: usize,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Locates the ball in a frame.
///
/// Intensity conversion, fixed-threshold binarization, 8-connected region
/// extraction, then the top-left corner of the largest region's bounding box.
/// Ties go to the region discovered first in raster order.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateEstimator {
    threshold: u8,
}

impl Default for CoordinateEstimator {
    fn default() -> Self {
        Self { threshold: 127 }
    }
}

impl CoordinateEstimator {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn estimate(&self, frame: &Frame) -> Option<CoordinatePair> {
        let mut best: Option<Region> = None;
        for region in self.regions(frame) {
            if best.as_ref().is_none_or(|b| region.area > b.area) {
                best = Some(region);
            }
        }
        best.map(|r| CoordinatePair::new(r.min_x as i32, r.min_y as i32))
    }

    /// Estimates and publishes the result. A miss leaves `cell` untouched.
    pub fn estimate_into(&self, frame: &Frame, cell: &CoordinateCell) -> Option<CoordinatePair> {
        let found = self.estimate(frame)?;
        cell.store(found);
        Some(found)
    }

    pub fn regions(&self, frame: &Frame) -> Vec<Region> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let mut mask = self.binarize(frame);
        let mut regions = Vec::new();
        let mut stack = Vec::new();

        for start in 0..mask.len() {
            if !mask[start] {
                continue;
            }
            mask[start] = false;
            stack.push(start);

            let mut region = Region {
                area: 0,
                min_x: u32::MAX,
                min_y: u32::MAX,
                max_x: 0,
                max_y: 0,
            };

            while let Some(idx) = stack.pop() {
                let (x, y) = (idx % width, idx / width);
                region.area += 1;
                region.min_x = region.min_x.min(x as u32);
                region.min_y = region.min_y.min(y as u32);
                region.max_x = region.max_x.max(x as u32);
                region.max_y = region.max_y.max(y as u32);

                for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                        let n = ny * width + nx;
                        if mask[n] {
                            mask[n] = false;
                            stack.push(n);
                        }
                    }
                }
            }

            regions.push(region);
        }

        regions
    }

    fn binarize(&self, frame: &Frame) -> Vec<bool> {
        frame
            .pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| intensity(px[0], px[1], px[2]) > self.threshold)
            .collect()
    }
}

/// BT.601 luma from BGR, in 14-bit fixed point.
fn intensity(b: u8, g: u8, r: u8) -> u8 {
    const B: u32 = 1868;
    const G: u32 = 9617;
    const R: u32 = 4899;
    let y = (B * u32::from(b) + G * u32::from(g) + R * u32::from(r) + (1 << 13)) >> 14;
    y.min(255) as u8
}
