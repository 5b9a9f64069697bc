// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for textgrab.

use thiserror::Error;

/// Top-level error type for all textgrab operations.
#[derive(Debug, Error)]
pub enum TextgrabError {
    // -- Engine errors --
    #[error("OCR engine not found: {0}")]
    EngineMissing(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("language detection failed: {0}")]
    LanguageDetection(String),

    // -- Document errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Export errors --
    #[error("{format} export requires {libraries}; rebuild with the matching feature enabled")]
    MissingDependency { format: String, libraries: String },

    #[error("export failed: {0}")]
    Export(String),

    // -- Settings / configuration --
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -- Input sources --
    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TextgrabError>;
