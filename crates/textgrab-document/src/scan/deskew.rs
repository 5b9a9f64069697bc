// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew estimation and correction for scanned text.
//
// Text lines and table rules show up as long straight edges. Their Hough
// angles, folded into (-45, 45], give the page tilt; the page is then
// rotated back about its centre on a canvas of the same size.

use image::{GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};
use textgrab_core::error::TextgrabError;
use textgrab_core::report::DeskewOutcome;
use tracing::{debug, info, instrument, warn};

/// Rotations at or below this many degrees are not worth the resampling.
pub const MIN_CORRECTION_DEGREES: f32 = 0.1;

const BLUR_SIGMA: f32 = 2.0;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
const SUPPRESSION_RADIUS: u32 = 8;
const MIN_VOTES: u32 = 40;
const MIN_SIDE: u32 = 8;

/// What the line analysis found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkewEstimate {
    NoLines,
    /// Mean tilt in degrees, positive when lines fall to the right.
    Angle { degrees: f32, lines: usize },
}

/// Tilt of one Hough line relative to the horizontal, folded into (-45, 45].
///
/// `angle_in_degrees` is the angle of the line's normal, so a horizontal line
/// reads 90 and a vertical one 0; both fold to 0.
pub fn line_skew_degrees(line: &PolarLine) -> f32 {
    let mut angle = line.angle_in_degrees as f32 - 90.0;
    if angle > 45.0 {
        angle -= 90.0;
    } else if angle <= -45.0 {
        angle += 90.0;
    }
    angle
}

/// Estimate the page tilt from its dominant straight edges.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn estimate_skew(gray: &GrayImage) -> Result<SkewEstimate, TextgrabError> {
    let (width, height) = gray.dimensions();
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(TextgrabError::ImageError(format!(
            "{width}x{height} image is too small for skew estimation"
        )));
    }

    let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);

    let vote_threshold = ((width as f32 * 0.3) as u32).max(MIN_VOTES);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold,
            suppression_radius: SUPPRESSION_RADIUS,
        },
    );
    debug!(line_count = lines.len(), vote_threshold, "Hough lines detected");

    if lines.is_empty() {
        return Ok(SkewEstimate::NoLines);
    }

    let total: f32 = lines.iter().map(line_skew_degrees).sum();
    Ok(SkewEstimate::Angle {
        degrees: total / lines.len() as f32,
        lines: lines.len(),
    })
}

/// Rotate `gray` by `-degrees` about its centre. Canvas size is unchanged and
/// uncovered corners are filled white.
pub fn rotate_back(gray: &GrayImage, degrees: f32) -> GrayImage {
    rotate_about_center(
        gray,
        (-degrees).to_radians(),
        Interpolation::Nearest,
        Luma([255u8]),
    )
}

/// Best-effort skew correction. Failures are logged and the image passes
/// through unrotated; the outcome says which path was taken.
#[instrument(skip(gray))]
pub fn deskew(gray: GrayImage) -> (GrayImage, DeskewOutcome) {
    match estimate_skew(&gray) {
        Ok(SkewEstimate::NoLines) => {
            debug!("No lines found; skipping deskew");
            (gray, DeskewOutcome::NoLines)
        }
        Ok(SkewEstimate::Angle { degrees, .. }) if degrees.abs() <= MIN_CORRECTION_DEGREES => {
            debug!(degrees, "Skew below threshold; skipping rotation");
            (gray, DeskewOutcome::BelowThreshold { angle: degrees })
        }
        Ok(SkewEstimate::Angle { degrees, lines }) => {
            info!(degrees, lines, "Correcting skew");
            (rotate_back(&gray, degrees), DeskewOutcome::Rotated { angle: degrees })
        }
        Err(err) => {
            warn!(%err, "Skew estimation failed; continuing without deskew");
            (
                gray,
                DeskewOutcome::Failed {
                    reason: err.to_string(),
                },
            )
        }
    }
}
