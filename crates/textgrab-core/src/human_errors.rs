// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages and troubleshooting hints.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity decides how the command line presents it.

use serde::{Deserialize, Serialize};

use crate::error::TextgrabError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth simply trying again.
    Transient,
    /// User must change something (file, flag, permission).
    ActionRequired,
    /// Retrying will not help; the input itself is the problem.
    Permanent,
    /// Software has to be installed first (engine, language pack, feature).
    InstallRequired,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Which kind of input failed, selecting the troubleshooting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Image,
    Pdf,
}

impl FailureKind {
    /// Noun used in "Error processing <noun>: ...".
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "PDF",
        }
    }
}

/// Numbered troubleshooting steps appended to a failure report.
pub fn troubleshooting(kind: FailureKind) -> &'static [&'static str] {
    match kind {
        FailureKind::Image => &[
            "Check if file is a valid image",
            "Verify Tesseract installation and language packs (run `textgrab languages`)",
            "Check file permissions",
            "Make sure `tesseract` is on PATH, or set tesseract_path in config.toml",
        ],
        FailureKind::Pdf => &[
            "Check if PDF is readable",
            "Scanned pages need embedded images; text drawn as vector shapes is not recognized",
            "Verify Tesseract installation and language packs (run `textgrab languages`)",
            "Make sure `tesseract` is on PATH, or set tesseract_path in config.toml",
        ],
    }
}

/// How to install Tesseract on the running platform.
pub fn install_instructions() -> &'static str {
    if cfg!(target_os = "windows") {
        "Install Tesseract from https://github.com/UB-Mannheim/tesseract/wiki and add its folder to PATH."
    } else if cfg!(target_os = "macos") {
        "Install Tesseract with Homebrew: brew install tesseract tesseract-lang"
    } else {
        "Install Tesseract with your package manager, e.g. sudo apt install tesseract-ocr tesseract-ocr-eng"
    }
}

/// Convert a `TextgrabError` into a `HumanError`.
pub fn humanize_error(err: &TextgrabError) -> HumanError {
    match err {
        // -- Engine errors --
        TextgrabError::EngineMissing(_) => HumanError {
            message: "Tesseract OCR isn't installed or can't be found.".into(),
            suggestion: format!(
                "{} Or point textgrab at it with --tesseract PATH.",
                install_instructions()
            ),
            severity: Severity::InstallRequired,
        },

        TextgrabError::Engine(detail) => humanize_engine_error(detail),

        TextgrabError::LanguageDetection(_) => HumanError {
            message: "The language of the text couldn't be detected.".into(),
            suggestion: "Choose the language yourself with --lang, or turn detection off with --no-auto-detect.".into(),
            severity: Severity::Transient,
        },

        // -- Document errors --
        TextgrabError::UnsupportedDocument(detail) => HumanError {
            message: "This type of document isn't supported.".into(),
            suggestion: format!(
                "Use a PDF or a PNG, JPEG, TIFF, BMP or GIF image. (File type: {detail})"
            ),
            severity: Severity::Permanent,
        },

        TextgrabError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or encrypted. Try opening it in a PDF viewer first, or try a different file.".into(),
            severity: Severity::Permanent,
        },

        TextgrabError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a PNG first.".into(),
            severity: Severity::Permanent,
        },

        // -- Export errors --
        TextgrabError::MissingDependency { format, libraries } => HumanError {
            message: format!("{format} export isn't available in this build."),
            suggestion: format!("Rebuild textgrab with {libraries} enabled, or export to another format."),
            severity: Severity::InstallRequired,
        },

        TextgrabError::Export(_) => HumanError {
            message: "The results couldn't be saved.".into(),
            suggestion: "Check the output folder exists and is writable, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        // -- Settings / configuration --
        TextgrabError::InvalidSetting(detail) => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        TextgrabError::Config(detail) => HumanError {
            message: "The configuration file couldn't be read.".into(),
            suggestion: format!("Check config.toml for typos, or remove it to use the defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },

        TextgrabError::Clipboard(_) => HumanError {
            message: "No image could be read from the clipboard.".into(),
            suggestion: "Copy an image (not a file name) to the clipboard, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        TextgrabError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "textgrab doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file to a different location first.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        TextgrabError::Serialization(_) => HumanError {
            message: "textgrab had an internal data problem.".into(),
            suggestion: "Try again without --json. If this keeps happening, please report it.".into(),
            severity: Severity::Transient,
        },
    }
}

/// Tesseract writes its own diagnostics to stderr; pick out the common ones.
fn humanize_engine_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("failed loading language") || lower.contains("error opening data file") {
        HumanError {
            message: "The language pack for this language isn't installed.".into(),
            suggestion: "Install the Tesseract language pack, or pick an installed one (run `textgrab languages`).".into(),
            severity: Severity::InstallRequired,
        }
    } else if lower.contains("read_params_file") || lower.contains("can't open") {
        HumanError {
            message: "Tesseract couldn't read its input.".into(),
            suggestion: "The temporary folder may be full or not writable. Free some space and try again.".into(),
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "Text recognition didn't work on this file.".into(),
            suggestion: format!(
                "Try a clearer scan, or a different page segmentation mode with --psm. (Detail: {detail})"
            ),
            severity: Severity::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engine_needs_install() {
        let human = humanize_error(&TextgrabError::EngineMissing("tesseract".into()));
        assert_eq!(human.severity, Severity::InstallRequired);
        assert!(human.suggestion.contains("--tesseract"));
    }

    #[test]
    fn missing_language_pack_needs_install() {
        let err = TextgrabError::Engine(
            "Error opening data file /usr/share/tessdata/xyz.traineddata\nFailed loading language 'xyz'".into(),
        );
        assert_eq!(humanize_error(&err).severity, Severity::InstallRequired);
    }

    #[test]
    fn unknown_engine_error_keeps_detail() {
        let human = humanize_error(&TextgrabError::Engine("segfault".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.suggestion.contains("segfault"));
    }

    #[test]
    fn missing_export_backend_names_libraries() {
        let err = TextgrabError::MissingDependency {
            format: "PDF".into(),
            libraries: "pdf-printpdf or pdf-lopdf".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::InstallRequired);
        assert!(human.suggestion.contains("pdf-printpdf or pdf-lopdf"));
    }

    #[test]
    fn not_found_is_action_required() {
        let err = TextgrabError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn troubleshooting_lists_are_distinct() {
        assert_eq!(troubleshooting(FailureKind::Image)[0], "Check if file is a valid image");
        assert_eq!(troubleshooting(FailureKind::Pdf)[0], "Check if PDF is readable");
        assert_eq!(FailureKind::Pdf.noun(), "PDF");
    }
}
