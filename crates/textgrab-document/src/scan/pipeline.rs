// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition entry points for single images and PDFs.
//
// Every entry point returns an `Outcome`. Errors become a failure report with
// troubleshooting hints instead of propagating, so a caller always has a
// result block to show.

use std::path::Path;

use chrono::Local;
use image::DynamicImage;
use textgrab_core::error::TextgrabError;
use textgrab_core::human_errors::FailureKind;
use textgrab_core::report::{
    EmbeddedImageOutcome, EmbeddedImageReport, FailureReport, ImageReport, Outcome, PageReport,
    PdfReport,
};
use textgrab_core::types::{ConfidenceTally, DocumentType, OcrResult, OcrSettings};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::pdf::reader::PdfReader;
use crate::scan::enhance::prepare_for_ocr;
use crate::scan::language::{available_languages, resolve_language};
use crate::scan::ocr::{OcrBackend, OcrRequest};

/// First-page render scale for the language detection pass (144 dpi).
const DETECTION_SCALE: f32 = 2.0;

/// Drives one backend over images and PDFs with fixed settings.
pub struct OcrPipeline<'a> {
    backend: &'a dyn OcrBackend,
    settings: OcrSettings,
    installed: Vec<String>,
}

impl<'a> OcrPipeline<'a> {
    /// Build a pipeline, asking the backend for its language packs once.
    pub fn new(backend: &'a dyn OcrBackend, settings: OcrSettings) -> Self {
        let installed = available_languages(backend);
        Self::with_languages(backend, settings, installed)
    }

    pub fn with_languages(
        backend: &'a dyn OcrBackend,
        settings: OcrSettings,
        installed: Vec<String>,
    ) -> Self {
        Self {
            backend,
            settings,
            installed,
        }
    }

    // -- Entry points ---------------------------------------------------------

    /// Recognize a file, dispatching on its extension.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn process_path(&self, path: &Path) -> Outcome {
        let file_name = display_name(path);
        match DocumentType::from_path(path) {
            Some(kind) if kind.is_pdf() => self.process_pdf(path),
            Some(_) => match ImageProcessor::open(path) {
                Ok(processor) => self.process_image(processor.into_dynamic(), &file_name),
                Err(err) => failure(FailureKind::Image, &file_name, &err),
            },
            None => failure(
                FailureKind::Image,
                &file_name,
                &TextgrabError::UnsupportedDocument(format!(
                    "{} is not a supported image or PDF",
                    path.display()
                )),
            ),
        }
    }

    /// Preprocess, resolve the language and recognize one image.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn process_image(&self, image: DynamicImage, file_name: &str) -> Outcome {
        let (width, height) = (image.width(), image.height());
        let prepared = prepare_for_ocr(image, &self.settings.preprocess);
        let language = resolve_language(
            self.backend,
            Some(&prepared.image),
            &self.settings,
            &self.installed,
        );

        match self.recognize(&prepared.image, &language.used) {
            Ok(result) => {
                let confidence = result.average_confidence();
                info!(
                    language = %language.used,
                    confidence,
                    chars = result.text.chars().count(),
                    "Image recognized"
                );
                Outcome::Image(ImageReport {
                    file_name: file_name.to_string(),
                    width,
                    height,
                    language,
                    page_seg_mode: self.settings.page_seg_mode,
                    engine_mode: self.settings.engine_mode,
                    preprocess: self.settings.preprocess,
                    preprocessing: prepared.report,
                    confidence,
                    text: result.text,
                    processed_at: Local::now(),
                })
            }
            Err(err) => failure(FailureKind::Image, file_name, &err),
        }
    }

    /// Native text plus OCR of every embedded image, page by page.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn process_pdf(&self, path: &Path) -> Outcome {
        let file_name = display_name(path);
        match PdfReader::open(path) {
            Ok(reader) => self.process_pdf_reader(&reader, &file_name),
            Err(err) => failure(FailureKind::Pdf, &file_name, &err),
        }
    }

    /// Same as [`process_pdf`](Self::process_pdf) for a document in memory.
    pub fn process_pdf_bytes(&self, data: &[u8], file_name: &str) -> Outcome {
        match PdfReader::from_bytes(data) {
            Ok(reader) => self.process_pdf_reader(&reader, file_name),
            Err(err) => failure(FailureKind::Pdf, file_name, &err),
        }
    }

    fn process_pdf_reader(&self, reader: &PdfReader, file_name: &str) -> Outcome {
        let sample = if self.settings.auto_detect_language {
            self.detection_sample(reader)
        } else {
            None
        };
        let language = resolve_language(
            self.backend,
            sample.as_ref(),
            &self.settings,
            &self.installed,
        );

        let mut tally = ConfidenceTally::default();
        let mut pages = Vec::with_capacity(reader.page_count());
        for number in reader.page_numbers() {
            match self.process_page(reader, number, &language.used, &mut tally) {
                Ok(page) => pages.push(page),
                Err(err) => return failure(FailureKind::Pdf, file_name, &err),
            }
        }

        let confidence = tally.average();
        info!(
            pages = pages.len(),
            scored = tally.count,
            confidence,
            "PDF processed"
        );
        Outcome::Pdf(PdfReport {
            file_name: file_name.to_string(),
            page_count: reader.page_count(),
            language,
            page_seg_mode: self.settings.page_seg_mode,
            engine_mode: self.settings.engine_mode,
            preprocess: self.settings.preprocess,
            confidence,
            pages,
            processed_at: Local::now(),
        })
    }

    // -- Helpers --------------------------------------------------------------

    /// The first page, rendered and preprocessed like any other input.
    fn detection_sample(&self, reader: &PdfReader) -> Option<DynamicImage> {
        let first = reader.page_numbers().first().copied()?;
        match reader.render_page(first, DETECTION_SCALE) {
            Ok(page) => {
                debug!(width = page.width(), height = page.height(), "First page rendered for detection");
                Some(prepare_for_ocr(page, &self.settings.preprocess).image)
            }
            Err(err) => {
                warn!(%err, "Could not render the first page for language detection");
                None
            }
        }
    }

    fn process_page(
        &self,
        reader: &PdfReader,
        number: u32,
        language: &str,
        tally: &mut ConfidenceTally,
    ) -> Result<PageReport, TextgrabError> {
        let native_text = reader.page_text(number)?;
        let images = reader
            .page_images(number)?
            .into_iter()
            .enumerate()
            .map(|(i, decoded)| {
                let outcome = match decoded.and_then(|image| {
                    let prepared = prepare_for_ocr(image, &self.settings.preprocess);
                    self.recognize(&prepared.image, language)
                }) {
                    Ok(result) => {
                        tally.add(&result);
                        if result.text.trim().is_empty() {
                            EmbeddedImageOutcome::NoText
                        } else {
                            EmbeddedImageOutcome::Text(result.text)
                        }
                    }
                    Err(err) => {
                        warn!(page = number, image = i + 1, %err, "Embedded image failed");
                        EmbeddedImageOutcome::Failed(err.to_string())
                    }
                };
                EmbeddedImageReport {
                    index: i + 1,
                    outcome,
                }
            })
            .collect();

        Ok(PageReport {
            number,
            native_text,
            images,
        })
    }

    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<OcrResult, TextgrabError> {
        self.backend.recognize(&OcrRequest {
            image,
            language: Some(language),
            page_seg_mode: self.settings.page_seg_mode,
            engine_mode: self.settings.engine_mode,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn failure(kind: FailureKind, file_name: &str, err: &TextgrabError) -> Outcome {
    warn!(file = file_name, %err, "Recognition failed");
    Outcome::Failed(FailureReport {
        kind,
        file_name: file_name.to_string(),
        error: err.to_string(),
    })
}
