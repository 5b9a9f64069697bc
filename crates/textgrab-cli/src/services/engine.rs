// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract discovery at start-up.

use std::path::Path;

use textgrab_core::error::{Result, TextgrabError};
use textgrab_core::human_errors::install_instructions;
use textgrab_document::TesseractEngine;
use textgrab_document::scan::OcrBackend;
use tracing::{debug, warn};

/// Result of looking for the engine once, when the program starts.
pub enum EngineStatus {
    Ready(TesseractEngine),
    Missing(String),
}

impl EngineStatus {
    /// Locate Tesseract at `explicit` or on PATH. A missing engine is
    /// announced here, once; commands report it again in their result.
    pub fn probe(explicit: Option<&Path>) -> Self {
        match TesseractEngine::locate(explicit) {
            Ok(engine) => {
                match engine.version() {
                    Ok(version) => debug!(%version, path = %engine.executable().display(), "Tesseract found"),
                    Err(err) => warn!(%err, "Tesseract found but did not report a version"),
                }
                Self::Ready(engine)
            }
            Err(err) => {
                warn!(%err, "Tesseract is not available");
                eprintln!("Tesseract OCR was not found. {}", install_instructions());
                Self::Missing(missing_detail(&err))
            }
        }
    }

    /// The engine, or the missing-engine error for the current call.
    pub fn require(&self) -> Result<&TesseractEngine> {
        match self {
            Self::Ready(engine) => Ok(engine),
            Self::Missing(detail) => Err(TextgrabError::EngineMissing(detail.clone())),
        }
    }
}

fn missing_detail(err: &TextgrabError) -> String {
    match err {
        TextgrabError::EngineMissing(detail) => detail.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engine_is_reported_per_call() {
        let status = EngineStatus::Missing("tesseract not on PATH".into());
        let err = status.require().err().unwrap();
        assert!(matches!(err, TextgrabError::EngineMissing(ref d) if d.contains("PATH")));
        // Still an error on the second call.
        assert!(status.require().is_err());
    }

    #[test]
    fn bogus_explicit_path_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let status = EngineStatus::probe(Some(&dir.path().join("no-such-tesseract")));
        assert!(matches!(status, EngineStatus::Missing(_)));
    }
}
