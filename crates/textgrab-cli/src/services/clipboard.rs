// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Clipboard image capture for `textgrab paste`.

use image::{DynamicImage, RgbaImage};
use textgrab_core::error::{Result, TextgrabError};

/// The image currently on the system clipboard.
#[cfg(feature = "clipboard")]
pub fn read_image() -> Result<DynamicImage> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|err| TextgrabError::Clipboard(format!("cannot open the clipboard: {err}")))?;
    let data = clipboard.get_image().map_err(|err| match err {
        arboard::Error::ContentNotAvailable => TextgrabError::Clipboard(
            "no image on the clipboard; copy a screenshot first".into(),
        ),
        other => TextgrabError::Clipboard(other.to_string()),
    })?;
    tracing::info!(width = data.width, height = data.height, "Image read from clipboard");
    rgba_image(data.width, data.height, data.bytes.into_owned())
}

#[cfg(not(feature = "clipboard"))]
pub fn read_image() -> Result<DynamicImage> {
    Err(TextgrabError::Clipboard(
        "this build has no clipboard support; rebuild with the `clipboard` feature".into(),
    ))
}

/// Wrap tightly packed RGBA bytes.
fn rgba_image(width: usize, height: usize, bytes: Vec<u8>) -> Result<DynamicImage> {
    let size_error =
        || TextgrabError::Clipboard(format!("clipboard image data does not match {width}x{height}"));
    let width = u32::try_from(width).map_err(|_| size_error())?;
    let height = u32::try_from(height).map_err(|_| size_error())?;
    RgbaImage::from_raw(width, height, bytes)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(size_error)
}
