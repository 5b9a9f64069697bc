// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization with the pure-Rust `hayro` renderer.

use std::sync::Arc;

use hayro::{InterpreterSettings, Pdf, RenderSettings};
use image::{DynamicImage, RgbImage};
use textgrab_core::error::TextgrabError;
use tracing::{debug, instrument};

/// Render page `index` (0-based) of the PDF in `data`. A scale of 1.0 is
/// 72 dpi. Transparent areas come out white.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn render_page(data: Arc<Vec<u8>>, index: usize, scale: f32) -> Result<DynamicImage, TextgrabError> {
    let pdf = Pdf::new(data)
        .map_err(|err| TextgrabError::PdfError(format!("cannot parse PDF for rendering: {err:?}")))?;
    let pages = pdf.pages();
    let page = pages.get(index).ok_or_else(|| {
        TextgrabError::PdfError(format!(
            "page {} out of range (document has {} pages)",
            index + 1,
            pages.len()
        ))
    })?;

    let media_box = page.media_box();
    let (width, height) = (media_box.x1 - media_box.x0, media_box.y1 - media_box.y0);
    if width <= 0.0 || height <= 0.0 {
        return Err(TextgrabError::PdfError(format!(
            "invalid page size {width}x{height}"
        )));
    }

    let settings = RenderSettings {
        x_scale: scale,
        y_scale: scale,
        ..Default::default()
    };
    let pixmap = hayro::render(page, &InterpreterSettings::default(), &settings);
    let (w, h) = (u32::from(pixmap.width()), u32::from(pixmap.height()));

    // Works for straight and premultiplied alpha alike: opaque pixels keep
    // their colour and transparent ones saturate to white.
    let rgb: Vec<u8> = pixmap
        .data_as_u8_slice()
        .chunks_exact(4)
        .flat_map(|px| {
            let cover = 255 - px[3];
            [
                px[0].saturating_add(cover),
                px[1].saturating_add(cover),
                px[2].saturating_add(cover),
            ]
        })
        .collect();
    debug!(width = w, height = h, "Page rendered");

    RgbImage::from_raw(w, h, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| TextgrabError::PdfError("rendered page has an inconsistent size".into()))
}
