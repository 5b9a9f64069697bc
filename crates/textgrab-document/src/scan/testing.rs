// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted OCR backend for pipeline tests.

use std::cell::RefCell;

use textgrab_core::error::TextgrabError;

use crate::scan::ocr::{OcrBackend, OcrRequest};

/// One call the pipeline made.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub language: Option<String>,
    pub page_seg_mode: u8,
    pub engine_mode: u8,
    pub size: (u32, u32),
    pub wanted_data: bool,
}

/// Answers detection passes (no language) and full passes from a script.
pub struct ScriptedBackend {
    detection: Result<String, String>,
    text: String,
    confidences: Vec<f32>,
    languages: Vec<String>,
    fail_width: Option<u32>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            detection: Ok(String::new()),
            text: "Recognized text\n".into(),
            confidences: vec![-1.0, 90.0, 80.0],
            languages: vec!["eng".into()],
            fail_width: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_detection_text(mut self, text: &str) -> Self {
        self.detection = Ok(text.into());
        self
    }

    pub fn failing_detection(mut self, reason: &str) -> Self {
        self.detection = Err(reason.into());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_confidences(mut self, confidences: &[f32]) -> Self {
        self.confidences = confidences.to_vec();
        self
    }

    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Full passes on images of this width fail.
    pub fn failing_for_width(mut self, width: u32) -> Self {
        self.fail_width = Some(width);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, request: &OcrRequest<'_>, wanted_data: bool) {
        self.calls.borrow_mut().push(RecordedCall {
            language: request.language.map(str::to_string),
            page_seg_mode: request.page_seg_mode.value(),
            engine_mode: request.engine_mode.value(),
            size: (request.image.width(), request.image.height()),
            wanted_data,
        });
    }

    fn check_full_pass(&self, request: &OcrRequest<'_>) -> Result<(), TextgrabError> {
        if self.fail_width == Some(request.image.width()) {
            return Err(TextgrabError::Engine("scripted failure".into()));
        }
        Ok(())
    }
}

impl OcrBackend for ScriptedBackend {
    fn image_to_string(&self, request: &OcrRequest<'_>) -> Result<String, TextgrabError> {
        self.record(request, false);
        if request.language.is_none() {
            return self.detection.clone().map_err(TextgrabError::Engine);
        }
        self.check_full_pass(request)?;
        Ok(self.text.clone())
    }

    fn image_to_data(&self, request: &OcrRequest<'_>) -> Result<Vec<f32>, TextgrabError> {
        self.record(request, true);
        self.check_full_pass(request)?;
        Ok(self.confidences.clone())
    }

    fn installed_languages(&self) -> Result<Vec<String>, TextgrabError> {
        Ok(self.languages.clone())
    }

    fn version(&self) -> Result<String, TextgrabError> {
        Ok("tesseract 5.3.0 (scripted)".into())
    }
}
