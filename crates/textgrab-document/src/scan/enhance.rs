// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement pipeline: normalization, denoising, skew correction, and
// binarization of scanned images ahead of text recognition.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::separable_filter_equal;
use textgrab_core::report::{DeskewOutcome, PreprocessReport, ThresholdMethod};
use textgrab_core::types::PreprocessOptions;
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;
use crate::scan::denoise::{self, NlMeansParams};
use crate::scan::deskew;

/// Neighbourhood side for the Gaussian adaptive threshold.
pub const ADAPTIVE_BLOCK_SIZE: u32 = 11;
/// Subtracted from the local mean before comparing.
pub const ADAPTIVE_C: i32 = 2;
const ADAPTIVE_SIGMA: f32 = 2.0;

/// Enhances scanned images for recognition.
///
/// Works on an 8-bit grayscale copy of the input. Each step consumes `self`
/// and returns the enhancer, so the steps chain:
///
/// ```ignore
/// let (gray, report) = ScanEnhancer::from_dynamic(&image)
///     .normalize()
///     .denoise(NlMeansParams::default())
///     .deskew()
///     .binarize_adaptive(11, 2)
///     .finish();
/// ```
pub struct ScanEnhancer {
    image: GrayImage,
    deskew: DeskewOutcome,
    threshold: ThresholdMethod,
}

/// Output of [`prepare_for_ocr`].
pub struct Prepared {
    /// Image to hand to the engine.
    pub image: DynamicImage,
    /// Present when preprocessing ran.
    pub report: Option<PreprocessReport>,
}

/// Run preprocessing as configured. With preprocessing off, the image is only
/// converted to a colour model the engine reads directly.
pub fn prepare_for_ocr(image: DynamicImage, options: &PreprocessOptions) -> Prepared {
    if !options.enabled {
        return Prepared {
            image: ImageProcessor::from_dynamic(image)
                .engine_compatible()
                .into_dynamic(),
            report: None,
        };
    }
    let (gray, report) = ScanEnhancer::from_dynamic(&image).run(options);
    Prepared {
        image: DynamicImage::ImageLuma8(gray),
        report: Some(report),
    }
}

impl ScanEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Start from any image; it is converted to 8-bit grayscale.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::from_gray(image.to_luma8())
    }

    pub fn from_gray(image: GrayImage) -> Self {
        Self {
            image,
            deskew: DeskewOutcome::Disabled,
            // Replaced by whichever binarization runs.
            threshold: ThresholdMethod::AlreadyBinary,
        }
    }

    /// Consume the enhancer, returning the image and what was done to it.
    pub fn finish(self) -> (GrayImage, PreprocessReport) {
        (
            self.image,
            PreprocessReport {
                deskew: self.deskew,
                threshold: self.threshold,
            },
        )
    }

    // -- Pipeline -------------------------------------------------------------

    /// Full preprocessing: normalize, denoise, optional deskew, then adaptive
    /// or global binarization.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn run(self, options: &PreprocessOptions) -> (GrayImage, PreprocessReport) {
        info!("Running scan preprocessing");
        let mut enhancer = self.normalize().denoise(NlMeansParams::default());
        if options.deskew {
            enhancer = enhancer.deskew();
        }
        let enhancer = if options.adaptive_threshold {
            enhancer.binarize_adaptive(ADAPTIVE_BLOCK_SIZE, ADAPTIVE_C)
        } else {
            enhancer.binarize_otsu()
        };
        enhancer.finish()
    }

    // -- Steps ----------------------------------------------------------------

    /// Stretch intensities so the darkest pixel becomes 0 and the brightest 255.
    /// Constant images are left as they are.
    #[instrument(skip(self))]
    pub fn normalize(self) -> Self {
        let (min, max) = self
            .image
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
        if min >= max {
            debug!("Constant image; skipping normalization");
            return self;
        }
        debug!(min, max, "Normalizing intensity range");

        let range = (max - min) as f32;
        let mut image = self.image;
        for pixel in image.pixels_mut() {
            let stretched = (pixel.0[0] - min) as f32 * 255.0 / range;
            pixel.0[0] = stretched.round() as u8;
        }
        Self { image, ..self }
    }

    /// Non-local-means denoising.
    pub fn denoise(self, params: NlMeansParams) -> Self {
        let image = denoise::denoise(&self.image, params);
        Self { image, ..self }
    }

    /// Best-effort skew correction; the outcome is recorded in the report.
    pub fn deskew(self) -> Self {
        let (image, outcome) = deskew::deskew(self.image);
        Self {
            image,
            deskew: outcome,
            ..self
        }
    }

    /// Gaussian-weighted adaptive threshold.
    ///
    /// The local mean is a Gaussian-weighted average over a `block_size`
    /// square. A pixel becomes white when it is brighter than that mean minus
    /// `c`, black otherwise.
    #[instrument(skip(self), fields(block_size, c))]
    pub fn binarize_adaptive(self, block_size: u32, c: i32) -> Self {
        info!(block_size, c, "Applying adaptive binarization");

        let kernel = gaussian_kernel(block_size, ADAPTIVE_SIGMA);
        let local_mean: GrayImage = separable_filter_equal(&self.image, &kernel);

        let mut image = self.image;
        for (pixel, mean) in image.pixels_mut().zip(local_mean.pixels()) {
            let binary = if pixel.0[0] as i32 > mean.0[0] as i32 - c { 255u8 } else { 0u8 };
            *pixel = Luma([binary]);
        }

        debug!("Adaptive binarization complete");
        Self {
            image,
            threshold: ThresholdMethod::Adaptive,
            ..self
        }
    }

    /// Global Otsu binarization, skipped when the image is already pure
    /// black and white.
    #[instrument(skip(self))]
    pub fn binarize_otsu(self) -> Self {
        if is_binary(&self.image) {
            debug!("Image already binary; skipping Otsu");
            return Self {
                threshold: ThresholdMethod::AlreadyBinary,
                ..self
            };
        }

        let threshold = otsu_threshold(&self.image);
        info!(threshold, "Applying Otsu binarization");

        let mut image = self.image;
        for pixel in image.pixels_mut() {
            pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
        }
        Self {
            image,
            threshold: ThresholdMethod::Otsu,
            ..self
        }
    }
}

// -- Helpers ------------------------------------------------------------------

/// Normalized 1-D Gaussian kernel of odd length `size`.
fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let total: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// True when every pixel is either 0 or 255.
fn is_binary(gray: &GrayImage) -> bool {
    gray.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Pixels at or below the returned value form the dark class.
fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 128;
    }

    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}
