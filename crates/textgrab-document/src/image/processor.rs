// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: loading, downscaling and engine-friendly colour
// conversion on in-memory images, using the `image` crate.

use std::io::{Seek, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use textgrab_core::error::TextgrabError;
use tracing::{debug, info, instrument};

/// Image pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// so calls chain:
///
/// ```ignore
/// let sample = ImageProcessor::open("scan.png")?
///     .fit_within(1600)
///     .engine_compatible()
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextgrabError> {
        let img = image::open(path.as_ref()).map_err(|err| match err {
            image::ImageError::IoError(io) => TextgrabError::Io(io),
            other => TextgrabError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                other
            )),
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Downscale so the longest edge is at most `max_edge` pixels, preserving
    /// aspect ratio. Smaller images are returned untouched.
    #[instrument(skip(self), fields(max_edge))]
    pub fn fit_within(self, max_edge: u32) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        if w.max(h) <= max_edge {
            return self;
        }
        let resized = self
            .image
            .resize(max_edge, max_edge, image::imageops::FilterType::Lanczos3);
        debug!(
            from_w = w,
            from_h = h,
            new_w = resized.width(),
            new_h = resized.height(),
            "Downscaled"
        );
        Self { image: resized }
    }

    /// Convert to a colour model the OCR engine reads directly: 8-bit gray
    /// stays as is, everything else becomes 8-bit RGB.
    pub fn engine_compatible(self) -> Self {
        match self.image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => self,
            other => {
                debug!(color = ?other.color(), "Converting to RGB8 for the engine");
                Self {
                    image: DynamicImage::ImageRgb8(other.to_rgb8()),
                }
            }
        }
    }
}

/// Encode `image` as PNG into `writer`.
pub fn write_png<W: Write + Seek>(image: &DynamicImage, writer: &mut W) -> Result<(), TextgrabError> {
    image
        .write_to(writer, ImageFormat::Png)
        .map_err(|err| TextgrabError::ImageError(format!("PNG encoding failed: {}", err)))
}
