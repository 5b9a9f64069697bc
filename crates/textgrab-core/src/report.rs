// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result reports produced by the recognition pipeline.
//
// A report carries everything needed to render the human-readable result
// block (metadata header followed by the text), and serializes to JSON for
// `--json` output.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::human_errors::{FailureKind, troubleshooting};
use crate::types::{EngineMode, LanguageResolution, PageSegMode, PreprocessOptions};

const RULE_WIDTH: usize = 50;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// -- Preprocessing ------------------------------------------------------------

/// Result of the best-effort skew correction step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeskewOutcome {
    /// Deskew was switched off.
    Disabled,
    /// No lines were found to estimate an angle from.
    NoLines,
    /// An angle was estimated but was too small to act on.
    BelowThreshold { angle: f32 },
    /// The image was rotated by `-angle` degrees.
    Rotated { angle: f32 },
    /// Estimation failed; the image passed through unrotated.
    Failed { reason: String },
}

impl fmt::Display for DeskewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("off"),
            Self::NoLines => f.write_str("skipped, no lines found"),
            Self::BelowThreshold { angle } => write!(f, "skipped, angle {angle:.2}°"),
            Self::Rotated { angle } => write!(f, "corrected {angle:.2}°"),
            Self::Failed { reason } => write!(f, "skipped after error: {reason}"),
        }
    }
}

/// Binarization applied as the last preprocessing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    Adaptive,
    Otsu,
    /// Image was already binary; global thresholding skipped.
    AlreadyBinary,
}

/// Which preprocessing steps ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessReport {
    pub deskew: DeskewOutcome,
    pub threshold: ThresholdMethod,
}

// -- Reports ------------------------------------------------------------------

/// Result of recognizing a single image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub language: LanguageResolution,
    pub page_seg_mode: PageSegMode,
    pub engine_mode: EngineMode,
    pub preprocess: PreprocessOptions,
    /// Present when preprocessing ran.
    pub preprocessing: Option<PreprocessReport>,
    pub confidence: f32,
    pub text: String,
    pub processed_at: DateTime<Local>,
}

/// Outcome of one embedded image inside a PDF page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum EmbeddedImageOutcome {
    Text(String),
    NoText,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedImageReport {
    /// 1-based position on the page.
    pub index: usize,
    pub outcome: EmbeddedImageOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    /// 1-based page number.
    pub number: u32,
    /// Native text layer, verbatim.
    pub native_text: String,
    pub images: Vec<EmbeddedImageReport>,
}

/// Result of processing a whole PDF.
#[derive(Debug, Clone, Serialize)]
pub struct PdfReport {
    pub file_name: String,
    pub page_count: usize,
    pub language: LanguageResolution,
    pub page_seg_mode: PageSegMode,
    pub engine_mode: EngineMode,
    pub preprocess: PreprocessOptions,
    /// Pooled over every embedded image's token confidences.
    pub confidence: f32,
    pub pages: Vec<PageReport>,
    pub processed_at: DateTime<Local>,
}

/// An input that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub file_name: String,
    pub error: String,
}

/// What a pipeline entry point produces. Errors are content, not `Err`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Image(ImageReport),
    Pdf(PdfReport),
    Failed(FailureReport),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The rendered result block.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

// -- Rendering ----------------------------------------------------------------

fn write_rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))
}

fn write_settings(
    f: &mut fmt::Formatter<'_>,
    language: &LanguageResolution,
    page_seg_mode: PageSegMode,
    engine_mode: EngineMode,
) -> fmt::Result {
    writeln!(f, "Language (Selected): {}", language.selected)?;
    writeln!(f, "Language (Detected): {}", language.detected)?;
    writeln!(f, "Language (OCR Used): {}", language.used)?;
    writeln!(f, "PSM: {}", page_seg_mode.value())?;
    writeln!(f, "OEM: {}", engine_mode.value())
}

fn write_preprocess(f: &mut fmt::Formatter<'_>, preprocess: &PreprocessOptions) -> fmt::Result {
    writeln!(f, "Preprocessing Enabled: {}", preprocess.enabled)?;
    if preprocess.enabled {
        writeln!(f, "  - Deskewing: {}", preprocess.deskew)?;
        writeln!(f, "  - Adaptive Threshold: {}", preprocess.adaptive_threshold)?;
    }
    Ok(())
}

impl fmt::Display for ImageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== IMAGE OCR RESULTS ===")?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Image size: {}x{}", self.width, self.height)?;
        write_settings(f, &self.language, self.page_seg_mode, self.engine_mode)?;
        write_preprocess(f, &self.preprocess)?;
        match &self.preprocessing {
            Some(report) if self.preprocess.deskew_active() => {
                writeln!(f, "  - Skew: {}", report.deskew)?;
            }
            _ => {}
        }
        writeln!(f, "OCR Confidence: {:.2}%", self.confidence)?;
        writeln!(f, "Characters found: {}", self.text.chars().count())?;
        writeln!(f, "Processed: {}", self.processed_at.format(TIMESTAMP_FORMAT))?;
        write_rule(f)?;
        writeln!(f)?;

        if self.text.trim().is_empty() {
            writeln!(f, "No text found in image. Try:")?;
            writeln!(f, "- Different Page Segmentation Mode (--psm) or OCR Engine Mode (--oem)")?;
            writeln!(f, "- Different language setting or --no-auto-detect")?;
            writeln!(f, "- Adjusting preprocessing (--no-deskew, --no-adaptive-threshold)")?;
            writeln!(f, "- Ensuring good image quality (resolution, clarity)")
        } else {
            f.write_str(&self.text)
        }
    }
}

impl fmt::Display for PdfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PDF OCR RESULTS ===")?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Pages: {}", self.page_count)?;
        write_settings(f, &self.language, self.page_seg_mode, self.engine_mode)?;
        writeln!(f, "Overall OCR Confidence: {:.2}%", self.confidence)?;
        write_preprocess(f, &self.preprocess)?;
        writeln!(f, "Processed: {}", self.processed_at.format(TIMESTAMP_FORMAT))?;
        write!(f, "{}", "=".repeat(RULE_WIDTH))?;

        let mut wrote_content = false;
        for page in &self.pages {
            if !page.native_text.trim().is_empty() {
                write!(
                    f,
                    "\n\n=== Page {} - Regular Text (Directly Extracted) ===\n{}",
                    page.number, page.native_text
                )?;
                wrote_content = true;
            }
            if page.images.is_empty() {
                continue;
            }
            write!(
                f,
                "\n\n=== Page {} - Embedded Images ({} found) ===",
                page.number,
                page.images.len()
            )?;
            for image in &page.images {
                match &image.outcome {
                    EmbeddedImageOutcome::Text(text) => write!(
                        f,
                        "\n\n--- Embedded Image {} (OCR Results) ---\n{}",
                        image.index, text
                    )?,
                    EmbeddedImageOutcome::NoText => write!(
                        f,
                        "\n\n--- Embedded Image {} (no text found after OCR) ---",
                        image.index
                    )?,
                    EmbeddedImageOutcome::Failed(error) => write!(
                        f,
                        "\n\n--- Embedded Image {} Error during OCR: {} ---",
                        image.index, error
                    )?,
                }
            }
            wrote_content = true;
        }

        if !wrote_content {
            write!(f, "\n\nNo text found in PDF")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error processing {}: {}\n\nTroubleshooting:",
            self.kind.noun(),
            self.error
        )?;
        for (i, step) in troubleshooting(self.kind).iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, step)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(report) => report.fmt(f),
            Self::Pdf(report) => report.fmt(f),
            Self::Failed(report) => report.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectedLanguage;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn image_report(text: &str) -> ImageReport {
        ImageReport {
            file_name: "scan.png".into(),
            width: 640,
            height: 480,
            language: LanguageResolution::from_detection(
                "eng",
                DetectedLanguage::Unavailable("fra".into()),
            ),
            page_seg_mode: PageSegMode::default(),
            engine_mode: EngineMode::default(),
            preprocess: PreprocessOptions::default(),
            preprocessing: Some(PreprocessReport {
                deskew: DeskewOutcome::Rotated { angle: 2.5 },
                threshold: ThresholdMethod::Adaptive,
            }),
            confidence: 91.256,
            text: text.into(),
            processed_at: at(),
        }
    }

    #[test]
    fn image_report_header_and_text() {
        let rendered = Outcome::Image(image_report("Hello world\n")).render();
        assert!(rendered.starts_with("=== IMAGE OCR RESULTS ===\nFile: scan.png\n"));
        assert!(rendered.contains("Image size: 640x480\n"));
        assert!(rendered.contains("Language (Detected): fra (Tesseract pack not installed)\n"));
        assert!(rendered.contains("Language (OCR Used): eng\n"));
        assert!(rendered.contains("  - Skew: corrected 2.50°\n"));
        assert!(rendered.contains("OCR Confidence: 91.26%\n"));
        assert!(rendered.contains("Characters found: 12\n"));
        assert!(rendered.contains("Processed: 2026-03-14 09:30:00\n"));
        assert!(rendered.ends_with("\n\nHello world\n"));
    }

    #[test]
    fn image_report_without_text_suggests_fixes() {
        let rendered = image_report("  \n").to_string();
        assert!(rendered.contains("No text found in image. Try:"));
    }

    #[test]
    fn preprocessing_details_hidden_when_disabled() {
        let mut report = image_report("x");
        report.preprocess = PreprocessOptions::disabled();
        let rendered = report.to_string();
        assert!(rendered.contains("Preprocessing Enabled: false\n"));
        assert!(!rendered.contains("Deskewing"));
        assert!(!rendered.contains("Skew:"));
    }

    #[test]
    fn pdf_report_lists_pages_and_images() {
        let report = PdfReport {
            file_name: "doc.pdf".into(),
            page_count: 2,
            language: LanguageResolution::selected_only("eng"),
            page_seg_mode: PageSegMode::default(),
            engine_mode: EngineMode::default(),
            preprocess: PreprocessOptions::default(),
            confidence: 75.0,
            pages: vec![
                PageReport {
                    number: 1,
                    native_text: "Native layer".into(),
                    images: Vec::new(),
                },
                PageReport {
                    number: 2,
                    native_text: String::new(),
                    images: vec![
                        EmbeddedImageReport {
                            index: 1,
                            outcome: EmbeddedImageOutcome::Text("Scanned".into()),
                        },
                        EmbeddedImageReport {
                            index: 2,
                            outcome: EmbeddedImageOutcome::NoText,
                        },
                        EmbeddedImageReport {
                            index: 3,
                            outcome: EmbeddedImageOutcome::Failed("bad stream".into()),
                        },
                    ],
                },
            ],
            processed_at: at(),
        };
        let rendered = Outcome::Pdf(report).render();
        assert!(rendered.contains("Language (Detected): N/A\n"));
        assert!(rendered.contains("Overall OCR Confidence: 75.00%\n"));
        assert!(rendered.contains("=== Page 1 - Regular Text (Directly Extracted) ===\nNative layer"));
        assert!(!rendered.contains("=== Page 2 - Regular Text"));
        assert!(rendered.contains("=== Page 2 - Embedded Images (3 found) ==="));
        assert!(rendered.contains("--- Embedded Image 1 (OCR Results) ---\nScanned"));
        assert!(rendered.contains("--- Embedded Image 2 (no text found after OCR) ---"));
        assert!(rendered.contains("--- Embedded Image 3 Error during OCR: bad stream ---"));
    }

    #[test]
    fn failure_report_lists_troubleshooting() {
        let outcome = Outcome::Failed(FailureReport {
            kind: FailureKind::Image,
            file_name: "broken.png".into(),
            error: "image processing failed: bad header".into(),
        });
        assert!(outcome.is_failure());
        assert_eq!(outcome.confidence(), None);
        let rendered = outcome.render();
        assert!(rendered.starts_with(
            "Error processing image: image processing failed: bad header\n\nTroubleshooting:\n1. Check if file is a valid image\n2. "
        ));
    }

    #[test]
    fn outcome_serializes_with_type_tag() {
        let json = serde_json::to_value(Outcome::Image(image_report("hi"))).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["language"]["used"], "eng");
        assert_eq!(json["preprocessing"]["deskew"]["outcome"], "rotated");
    }
}
