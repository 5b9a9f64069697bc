// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// textgrab-document: everything between an input file and an output file.
//
// Image loading and conversion, scan preprocessing (normalize, denoise,
// deskew, binarize), Tesseract recognition with language auto-detection,
// PDF text and embedded-image extraction, and export to txt/PDF/DOCX/RTF/HTML.

pub mod export;
pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary structs so callers can use `textgrab_document::OcrPipeline` etc.
pub use export::{Backends, Exporter};
pub use image::processor::ImageProcessor;
pub use pdf::reader::PdfReader;
pub use scan::enhance::{Prepared, ScanEnhancer, prepare_for_ocr};
pub use scan::ocr::{OcrBackend, OcrRequest, TesseractEngine};
pub use scan::pipeline::OcrPipeline;
