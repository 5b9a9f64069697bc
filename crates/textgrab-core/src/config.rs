// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TextgrabError};
use crate::types::{ExportFormat, OcrSettings, PaperSize};

/// Persistent application settings, read from `config.toml`.
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit path to the `tesseract` executable. `PATH` lookup when unset.
    pub tesseract_path: Option<PathBuf>,
    /// Recognition defaults; command-line flags override them.
    pub ocr: OcrSettings,
    pub export: ExportSettings,
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory for quick-save exports. Current directory when unset.
    pub output_dir: Option<PathBuf>,
    /// Format used by `--export` when none is named.
    pub default_format: ExportFormat,
    pub paper_size: PaperSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            ocr: OcrSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            default_format: ExportFormat::Text,
            paper_size: PaperSize::Letter,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| TextgrabError::Config(e.to_string()))
    }

    /// Load from `path`. A missing file yields the defaults; an unreadable
    /// or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source).map_err(|e| match e {
                TextgrabError::Config(msg) => {
                    TextgrabError::Config(format!("{}: {msg}", path.display()))
                }
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Quick-save directory, falling back to the current directory.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
