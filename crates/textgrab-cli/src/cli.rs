// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use textgrab_core::error::TextgrabError;
use textgrab_core::types::{EngineMode, ExportFormat, OcrSettings, PageSegMode};

/// Extract text from images, PDFs and clipboard screenshots with Tesseract.
#[derive(Debug, Parser)]
#[command(name = "textgrab", version, about)]
pub struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/textgrab/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Tesseract executable, overriding the config file and PATH lookup.
    #[arg(long, global = true, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recognize text in an image or PDF.
    Extract(ExtractArgs),
    /// Recognize text in the image currently on the clipboard.
    Paste(OcrArgs),
    /// Convert a text file to another export format.
    Export(ExportArgs),
    /// List the installed Tesseract language packs.
    Languages,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Image (PNG, JPEG, TIFF, BMP, GIF) or PDF to read.
    pub file: PathBuf,

    #[command(flatten)]
    pub ocr: OcrArgs,
}

/// Recognition and output options shared by `extract` and `paste`.
#[derive(Debug, Args)]
pub struct OcrArgs {
    /// Tesseract language pack, e.g. eng, deu, chi_sim.
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Detect the text language before recognition.
    #[arg(long, overrides_with = "no_auto_detect")]
    pub auto_detect: bool,

    /// Always use the selected language.
    #[arg(long, overrides_with = "auto_detect")]
    pub no_auto_detect: bool,

    /// Page segmentation mode (0-13).
    #[arg(long, value_name = "N")]
    pub psm: Option<u8>,

    /// OCR engine mode (0-3).
    #[arg(long, value_name = "N")]
    pub oem: Option<u8>,

    /// Skip image preprocessing entirely.
    #[arg(long)]
    pub no_preprocess: bool,

    /// Skip skew correction.
    #[arg(long)]
    pub no_deskew: bool,

    /// Use global Otsu binarization instead of the adaptive threshold.
    #[arg(long)]
    pub no_adaptive_threshold: bool,

    /// Also export the result block (txt, pdf, docx, rtf, html).
    #[arg(long, value_name = "FMT")]
    pub export: Option<ExportFormat>,

    /// Export destination; defaults to a timestamped file in the output directory.
    #[arg(long, short, value_name = "PATH", requires = "export")]
    pub output: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl OcrArgs {
    /// Layer the flags over settings loaded from the config file.
    pub fn apply(&self, settings: &mut OcrSettings) -> Result<(), TextgrabError> {
        if let Some(lang) = &self.lang {
            settings.language = lang.clone();
        }
        if self.auto_detect {
            settings.auto_detect_language = true;
        }
        if self.no_auto_detect {
            settings.auto_detect_language = false;
        }
        if let Some(psm) = self.psm {
            settings.page_seg_mode = PageSegMode::new(psm)?;
        }
        if let Some(oem) = self.oem {
            settings.engine_mode = EngineMode::new(oem)?;
        }
        if self.no_preprocess {
            settings.preprocess.enabled = false;
        }
        if self.no_deskew {
            settings.preprocess.deskew = false;
        }
        if self.no_adaptive_threshold {
            settings.preprocess.adaptive_threshold = false;
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// UTF-8 text file to convert.
    pub text_file: PathBuf,

    /// Target format; defaults to the configured export format.
    #[arg(long, short, value_name = "FMT")]
    pub format: Option<ExportFormat>,

    /// Destination; defaults to a timestamped file in the output directory.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
