// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-local-means denoising for grayscale scans.
//
// Every pixel becomes a weighted mean of the pixels in its search window,
// weighted by how similar the surrounding template patches are. Patch
// distances for one search offset at a time come from a summed-area table
// of squared differences, so each offset costs O(width * height). Weights
// come from a table indexed by the whole mean squared patch distance.

use image::{GrayImage, Luma};
use tracing::{debug, instrument};

/// Patches whose weight would fall below this are ignored.
const WEIGHT_FLOOR: f32 = 1e-3;

/// Largest possible mean squared distance between 8-bit patches.
const MAX_DISTANCE: usize = 255 * 255;

/// Filter parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NlMeansParams {
    /// Filter strength. Larger values remove more noise and more detail.
    pub h: f32,
    /// Side of the square patch compared between pixels (odd).
    pub template_window: u32,
    /// Side of the square area searched for similar patches (odd).
    pub search_window: u32,
}

impl Default for NlMeansParams {
    fn default() -> Self {
        Self {
            h: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

impl NlMeansParams {
    fn template_radius(&self) -> usize {
        (self.template_window / 2) as usize
    }

    fn search_radius(&self) -> usize {
        (self.search_window / 2) as usize
    }

    /// `exp(-d / h^2)` for every mean squared distance `d` whose weight is
    /// still above [`WEIGHT_FLOOR`].
    fn weight_table(&self) -> Vec<f32> {
        let h2 = (self.h * self.h).max(f32::EPSILON);
        let cutoff = ((-WEIGHT_FLOOR.ln() * h2).ceil() as usize).min(MAX_DISTANCE);
        (0..=cutoff).map(|d| (-(d as f32) / h2).exp()).collect()
    }
}

/// Grayscale image with a replicated border, so window lookups never need
/// bounds checks.
struct Padded {
    data: Vec<u8>,
    stride: usize,
}

impl Padded {
    fn new(gray: &GrayImage, pad: usize) -> Self {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let stride = w + 2 * pad;
        let rows = h + 2 * pad;
        let mut data = Vec::with_capacity(stride * rows);
        for y in 0..rows {
            let sy = y.saturating_sub(pad).min(h - 1) as u32;
            for x in 0..stride {
                let sx = x.saturating_sub(pad).min(w - 1) as u32;
                data.push(gray.get_pixel(sx, sy).0[0]);
            }
        }
        Self { data, stride }
    }

    /// `len` samples of row `y` starting at column `x`.
    #[inline]
    fn row(&self, x: usize, y: usize, len: usize) -> &[u8] {
        &self.data[y * self.stride + x..][..len]
    }
}

/// Denoise `gray` with non-local means.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn denoise(gray: &GrayImage, params: NlMeansParams) -> GrayImage {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w == 0 || h == 0 {
        return gray.clone();
    }

    let t = params.template_radius();
    let s = params.search_radius();
    let padded = Padded::new(gray, s + t);
    let table = params.weight_table();

    // Squared-difference field covers every template around every pixel.
    // Window sums never exceed 255^2 * span^2, so wrapping u32 arithmetic
    // recovers them exactly.
    let dw = w + 2 * t;
    let dh = h + 2 * t;
    let stride = dw + 1;
    let span = 2 * t + 1;
    let patch_area = (span * span) as u32;
    let mut integral = vec![0u32; stride * (dh + 1)];

    let mut weighted = vec![0f32; w * h];
    let mut weights = vec![0f32; w * h];

    for oy in 0..=2 * s {
        for ox in 0..=2 * s {
            for b in 0..dh {
                let centre = padded.row(s, b + s, dw);
                let shifted = padded.row(ox, b + oy, dw);
                let (done, rest) = integral.split_at_mut((b + 1) * stride);
                let above = &done[b * stride..];
                let row = &mut rest[..stride];
                let mut row_sum = 0u32;
                for a in 0..dw {
                    let d = i32::from(centre[a]) - i32::from(shifted[a]);
                    row_sum = row_sum.wrapping_add((d * d) as u32);
                    row[a + 1] = row_sum.wrapping_add(above[a + 1]);
                }
            }

            for j in 0..h {
                let top = &integral[j * stride..][..stride];
                let bottom = &integral[(j + span) * stride..][..stride];
                let source = padded.row(t + ox, j + t + oy, w);
                let acc_values = &mut weighted[j * w..][..w];
                let acc_weights = &mut weights[j * w..][..w];
                for i in 0..w {
                    let sum = bottom[i + span]
                        .wrapping_add(top[i])
                        .wrapping_sub(top[i + span])
                        .wrapping_sub(bottom[i]);
                    let Some(&weight) = table.get((sum / patch_area) as usize) else {
                        continue;
                    };
                    acc_values[i] += weight * f32::from(source[i]);
                    acc_weights[i] += weight;
                }
            }
        }
    }

    debug!(offsets = (2 * s + 1) * (2 * s + 1), table = table.len(), "Non-local means complete");

    // The zero offset always contributes weight 1, so no pixel divides by 0.
    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        let idx = y as usize * w + x as usize;
        Luma([(weighted[idx] / weights[idx]).round().clamp(0.0, 255.0) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_image_is_unchanged() {
        let img = GrayImage::from_pixel(30, 20, Luma([137]));
        let out = denoise(&img, NlMeansParams::default());
        assert_eq!(out.dimensions(), (30, 20));
        assert!(out.pixels().all(|p| p.0[0] == 137));
    }

    #[test]
    fn isolated_spike_is_suppressed() {
        let mut img = GrayImage::from_pixel(41, 41, Luma([100]));
        img.put_pixel(20, 20, Luma([255]));
        let out = denoise(&img, NlMeansParams::default());
        let centre = out.get_pixel(20, 20).0[0];
        assert!(centre < 200, "spike survived as {centre}");
        assert_eq!(out.get_pixel(0, 0).0[0], 100);
    }

    #[test]
    fn tiny_image_does_not_panic() {
        let img = GrayImage::from_pixel(1, 1, Luma([42]));
        let out = denoise(&img, NlMeansParams::default());
        assert_eq!(out.get_pixel(0, 0).0[0], 42);
    }

    #[test]
    fn weight_table_stops_at_floor() {
        let table = NlMeansParams::default().weight_table();
        assert_eq!(table[0], 1.0);
        assert!(table.windows(2).all(|pair| pair[1] < pair[0]));
        assert!(*table.last().unwrap() < WEIGHT_FLOOR * 1.01);
        assert!(table.len() < 1000);
    }

    #[test]
    fn gentle_noise_is_smoothed() {
        // Checkerboard of 118/122 around a flat 120.
        let img = GrayImage::from_fn(40, 40, |x, y| Luma([if (x + y) % 2 == 0 { 118 } else { 122 }]));
        let out = denoise(&img, NlMeansParams::default());
        // Away from the replicated border.
        for y in 14..26 {
            for x in 14..26 {
                let v = out.get_pixel(x, y).0[0];
                assert!((119..=121).contains(&v), "noise survived as {v} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn strong_edges_are_preserved() {
        // Left half black, right half white.
        let img = GrayImage::from_fn(40, 20, |x, _| Luma([if x < 20 { 0 } else { 255 }]));
        let out = denoise(&img, NlMeansParams::default());
        assert!(out.get_pixel(5, 10).0[0] < 20);
        assert!(out.get_pixel(35, 10).0[0] > 235);
    }
}
