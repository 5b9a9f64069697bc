// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for textgrab.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::TextgrabError;

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Gif,
}

impl DocumentType {
    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Infer document type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

// -- Engine parameters --------------------------------------------------------

/// Tesseract page-segmentation mode (`--psm`), 0 through 13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PageSegMode(u8);

impl PageSegMode {
    pub const MAX: u8 = 13;
    /// Fully automatic page segmentation, no OSD. Engine default.
    pub const AUTO: Self = Self(3);
    /// Treat the image as a single text line. Used for the detection pass.
    pub const SINGLE_LINE: Self = Self(7);

    pub fn new(value: u8) -> Result<Self, TextgrabError> {
        if value > Self::MAX {
            return Err(TextgrabError::InvalidSetting(format!(
                "page segmentation mode must be 0-{}, got {}",
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "OSD Only",
            1 => "Auto OSD+PSM",
            2 => "Auto PSM, OSD",
            3 => "Auto PSM",
            4 => "Single Column",
            5 => "Single Block, Vertical",
            6 => "Single Block",
            7 => "Single Line",
            8 => "Single Word",
            9 => "Single Char",
            10 => "Sparse Text",
            11 => "Sparse Text, OSD",
            12 => "Raw Line",
            _ => "Raw Word",
        }
    }
}

impl Default for PageSegMode {
    fn default() -> Self {
        Self::AUTO
    }
}

impl TryFrom<u8> for PageSegMode {
    type Error = TextgrabError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSegMode> for u8 {
    fn from(mode: PageSegMode) -> Self {
        mode.0
    }
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.description())
    }
}

/// Tesseract OCR engine mode (`--oem`), 0 through 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EngineMode(u8);

impl EngineMode {
    pub const MAX: u8 = 3;
    pub const LEGACY: Self = Self(0);
    pub const LSTM: Self = Self(1);
    pub const DEFAULT: Self = Self(3);

    pub fn new(value: u8) -> Result<Self, TextgrabError> {
        if value > Self::MAX {
            return Err(TextgrabError::InvalidSetting(format!(
                "engine mode must be 0-{}, got {}",
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Legacy only",
            1 => "LSTM only",
            2 => "Legacy + LSTM",
            _ => "Default, Tesseract + LSTM",
        }
    }
}

impl Default for EngineMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for EngineMode {
    type Error = TextgrabError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EngineMode> for u8 {
    fn from(mode: EngineMode) -> Self {
        mode.0
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.description())
    }
}

// -- Settings -----------------------------------------------------------------

/// Image preprocessing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Master switch. When off, `deskew` and `adaptive_threshold` are ignored.
    pub enabled: bool,
    pub deskew: bool,
    /// Gaussian adaptive threshold instead of global Otsu.
    pub adaptive_threshold: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            deskew: true,
            adaptive_threshold: true,
        }
    }
}

impl PreprocessOptions {
    /// Preprocessing fully disabled.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            deskew: false,
            adaptive_threshold: false,
        }
    }

    /// Whether deskew will actually run.
    pub fn deskew_active(&self) -> bool {
        self.enabled && self.deskew
    }
}

/// Everything a recognition run needs to know, passed explicitly into the
/// pipeline calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Language pack chosen by the user (Tesseract code, e.g. `eng`).
    pub language: String,
    /// Run a quick detection pass and switch language when the pack exists.
    pub auto_detect_language: bool,
    pub page_seg_mode: PageSegMode,
    pub engine_mode: EngineMode,
    pub preprocess: PreprocessOptions,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            auto_detect_language: true,
            page_seg_mode: PageSegMode::default(),
            engine_mode: EngineMode::default(),
            preprocess: PreprocessOptions::default(),
        }
    }
}

// -- Recognition results ------------------------------------------------------

/// Confidence value the engine reports for tokens with no confidence
/// (page, block, paragraph, and line rows).
pub const NO_CONFIDENCE: f32 = -1.0;

/// Text plus per-token confidences from a single recognition call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    /// Per-token confidence, 0-100, or [`NO_CONFIDENCE`].
    pub confidences: Vec<f32>,
}

impl OcrResult {
    pub fn new(text: String, confidences: Vec<f32>) -> Self {
        Self { text, confidences }
    }

    /// Confidences that are not the sentinel.
    pub fn scored(&self) -> impl Iterator<Item = f32> + '_ {
        self.confidences.iter().copied().filter(|c| *c >= 0.0)
    }

    /// Arithmetic mean of the non-sentinel confidences; 0 when there are none.
    pub fn average_confidence(&self) -> f32 {
        let (sum, count) = self
            .scored()
            .fold((0.0f64, 0usize), |(sum, count), c| (sum + c as f64, count + 1));
        if count == 0 {
            0.0
        } else {
            (sum / count as f64) as f32
        }
    }
}

/// Running total of confidences across several recognition calls (all the
/// embedded images of a PDF).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTally {
    pub total: f64,
    pub count: usize,
}

impl ConfidenceTally {
    pub fn add(&mut self, result: &OcrResult) {
        for c in result.scored() {
            self.total += c as f64;
            self.count += 1;
        }
    }

    pub fn average(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.total / self.count as f64) as f32
        }
    }
}

// -- Language resolution ------------------------------------------------------

/// What the auto-detection pass concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum DetectedLanguage {
    /// Auto-detection was switched off.
    NotRequested,
    /// The detection pass produced no text to classify.
    NoSample,
    /// Detected and the matching language pack is installed.
    Available(String),
    /// Detected, but no language pack is installed for it.
    Unavailable(String),
    /// Detection pass or classifier failed.
    Failed(String),
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequested => f.write_str("N/A"),
            Self::NoSample => f.write_str("None (no text detected for auto-detection)"),
            Self::Available(code) => f.write_str(code),
            Self::Unavailable(code) => write!(f, "{code} (Tesseract pack not installed)"),
            Self::Failed(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// The selected language, the detection outcome, and the language the full
/// recognition pass actually used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageResolution {
    pub selected: String,
    pub detected: DetectedLanguage,
    pub used: String,
}

impl LanguageResolution {
    /// Resolution when detection did not run.
    pub fn selected_only(selected: &str) -> Self {
        Self {
            selected: selected.to_string(),
            detected: DetectedLanguage::NotRequested,
            used: selected.to_string(),
        }
    }

    /// Build a resolution from a detection outcome. Only an installed
    /// detection replaces the selected language.
    pub fn from_detection(selected: &str, detected: DetectedLanguage) -> Self {
        let used = match &detected {
            DetectedLanguage::Available(code) => code.clone(),
            _ => selected.to_string(),
        };
        Self {
            selected: selected.to_string(),
            detected,
            used,
        }
    }

    /// True when a language was detected but its pack was missing, so the
    /// selected language was used instead.
    pub fn fell_back(&self) -> bool {
        matches!(self.detected, DetectedLanguage::Unavailable(_))
    }
}

// -- Export -------------------------------------------------------------------

/// Output document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[serde(rename = "txt")]
    Text,
    Pdf,
    Docx,
    Rtf,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Text,
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Rtf,
        ExportFormat::Html,
    ];

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Rtf => "rtf",
            Self::Html => "html",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "rtf" => Some(Self::Rtf),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = TextgrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.')).ok_or_else(|| {
            TextgrabError::InvalidSetting(format!(
                "unknown export format '{s}' (expected txt, pdf, docx, rtf, or html)"
            ))
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where an export goes and in which format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
}

impl ExportTarget {
    pub fn new(path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Quick-save target: `ocr_results_<timestamp>.<ext>` inside `dir`.
    pub fn quick_save(dir: &Path, format: ExportFormat, at: DateTime<Local>) -> Self {
        Self::new(dir.join(quick_save_file_name(format, at)), format)
    }
}

/// File name used by quick save, e.g. `ocr_results_20260314_093000.txt`.
pub fn quick_save_file_name(format: ExportFormat, at: DateTime<Local>) -> String {
    format!(
        "ocr_results_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Standard paper sizes for PDF export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
        }
    }
}
