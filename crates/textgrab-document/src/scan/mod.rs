// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: preprocessing, Tesseract recognition, language
// detection, and the image/PDF recognition entry points.

pub mod denoise;
pub mod deskew;
pub mod enhance;
pub mod language;
pub mod ocr;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use enhance::ScanEnhancer;
pub use ocr::{OcrBackend, OcrRequest, TesseractEngine};
pub use pipeline::OcrPipeline;
