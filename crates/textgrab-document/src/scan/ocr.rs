// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition through the Tesseract command-line engine.
//
// Every call writes the prepared image to a temporary PNG, runs
// `tesseract <png> stdout ...`, and reads the result from stdout. The
// `tsv` output config supplies per-token confidences.
//
// The `OcrBackend` trait is the seam the recognition pipeline talks to, so
// the pipeline can run against a scripted backend in tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use textgrab_core::error::TextgrabError;
use textgrab_core::types::{EngineMode, OcrResult, PageSegMode};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::write_png;

/// Executable name looked up on `PATH`.
pub const TESSERACT_BINARY: &str = "tesseract";

/// One recognition call.
#[derive(Debug, Clone, Copy)]
pub struct OcrRequest<'a> {
    pub image: &'a DynamicImage,
    /// Language pack to load; `None` lets the engine use its default.
    pub language: Option<&'a str>,
    pub page_seg_mode: PageSegMode,
    pub engine_mode: EngineMode,
}

/// An OCR engine the pipeline can drive.
pub trait OcrBackend {
    /// Recognized text.
    fn image_to_string(&self, request: &OcrRequest<'_>) -> Result<String, TextgrabError>;

    /// Per-token confidences (0-100, or -1 for rows without one).
    fn image_to_data(&self, request: &OcrRequest<'_>) -> Result<Vec<f32>, TextgrabError>;

    /// Installed language packs, as reported by the engine.
    fn installed_languages(&self) -> Result<Vec<String>, TextgrabError>;

    /// Engine version string.
    fn version(&self) -> Result<String, TextgrabError>;

    /// Confidences first, then clean text, as two separate engine calls.
    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResult, TextgrabError> {
        let confidences = self.image_to_data(request)?;
        let text = self.image_to_string(request)?;
        Ok(OcrResult::new(text, confidences))
    }
}

// -- Engine location ----------------------------------------------------------

/// Where to find the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub executable: PathBuf,
}

impl TesseractConfig {
    /// Use `explicit` when given, otherwise search `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, TextgrabError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let executable = which::which(TESSERACT_BINARY).map_err(|err| {
                    TextgrabError::EngineMissing(format!(
                        "`{TESSERACT_BINARY}` not found on PATH: {err}"
                    ))
                })?;
                debug!(path = %executable.display(), "Found tesseract on PATH");
                Ok(Self { executable })
            }
        }
    }

    /// Use a specific executable, which must exist.
    pub fn from_path(path: &Path) -> Result<Self, TextgrabError> {
        if !path.is_file() {
            return Err(TextgrabError::EngineMissing(format!(
                "no tesseract executable at {}",
                path.display()
            )));
        }
        Ok(Self {
            executable: path.to_path_buf(),
        })
    }
}

// -- Tesseract engine ---------------------------------------------------------

/// [`OcrBackend`] backed by the Tesseract executable.
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        info!(executable = %config.executable.display(), "Using Tesseract engine");
        Self { config }
    }

    /// Locate the engine (explicit path or `PATH`) and wrap it.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, TextgrabError> {
        TesseractConfig::locate(explicit).map(Self::new)
    }

    pub fn executable(&self) -> &Path {
        &self.config.executable
    }

    /// Run the executable and return stdout and stderr.
    fn run(&self, args: &[String]) -> Result<(String, String), TextgrabError> {
        debug!(?args, "Invoking tesseract");
        let output = Command::new(&self.config.executable)
            .args(args)
            .output()
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => TextgrabError::EngineMissing(format!(
                    "cannot run {}: {}",
                    self.config.executable.display(),
                    err
                )),
                _ => TextgrabError::Engine(format!("failed to start tesseract: {err}")),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            let detail = stderr.trim();
            return Err(TextgrabError::Engine(if detail.is_empty() {
                format!("tesseract exited with {}", output.status)
            } else {
                detail.to_string()
            }));
        }
        Ok((stdout, stderr))
    }

    /// Write the request's image to a temporary PNG and run a recognition
    /// with it. The file is removed afterwards.
    fn recognize_with(
        &self,
        request: &OcrRequest<'_>,
        output_config: Option<&str>,
    ) -> Result<String, TextgrabError> {
        let mut file = tempfile::Builder::new()
            .prefix("textgrab-")
            .suffix(".png")
            .tempfile()?;
        write_png(request.image, &mut file)?;
        file.flush()?;

        let args = recognition_args(file.path(), request, output_config);
        let result = self.run(&args).map(|(stdout, _)| stdout);

        if let Err(err) = file.close() {
            debug!(%err, "Could not remove temporary image");
        }
        result
    }
}

impl OcrBackend for TesseractEngine {
    #[instrument(skip_all, fields(lang = ?request.language, psm = request.page_seg_mode.value()))]
    fn image_to_string(&self, request: &OcrRequest<'_>) -> Result<String, TextgrabError> {
        let text = self.recognize_with(request, None)?;
        debug!(chars = text.chars().count(), "Text recognized");
        Ok(text)
    }

    #[instrument(skip_all, fields(lang = ?request.language, psm = request.page_seg_mode.value()))]
    fn image_to_data(&self, request: &OcrRequest<'_>) -> Result<Vec<f32>, TextgrabError> {
        let tsv = self.recognize_with(request, Some("tsv"))?;
        let confidences = parse_tsv_confidences(&tsv)?;
        debug!(tokens = confidences.len(), "Confidence data parsed");
        Ok(confidences)
    }

    fn installed_languages(&self) -> Result<Vec<String>, TextgrabError> {
        let (stdout, stderr) = self.run(&["--list-langs".to_string()])?;
        // Older releases print the list on stderr.
        let languages = match parse_language_list(&stdout) {
            langs if langs.is_empty() => parse_language_list(&stderr),
            langs => langs,
        };
        Ok(languages)
    }

    fn version(&self) -> Result<String, TextgrabError> {
        let (stdout, stderr) = self.run(&["--version".to_string()])?;
        stdout
            .lines()
            .chain(stderr.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| TextgrabError::Engine("tesseract printed no version".into()))
    }
}

// -- Argument building and output parsing -------------------------------------

fn recognition_args(
    image: &Path,
    request: &OcrRequest<'_>,
    output_config: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        image.display().to_string(),
        "stdout".to_string(),
        "--oem".to_string(),
        request.engine_mode.value().to_string(),
        "--psm".to_string(),
        request.page_seg_mode.value().to_string(),
    ];
    if let Some(lang) = request.language {
        args.push("-l".to_string());
        args.push(lang.to_string());
    }
    if let Some(config) = output_config {
        args.push(config.to_string());
    }
    args
}

/// Pull the `conf` column out of Tesseract's TSV output.
fn parse_tsv_confidences(tsv: &str) -> Result<Vec<f32>, TextgrabError> {
    let mut lines = tsv.lines();
    let header = lines
        .next()
        .ok_or_else(|| TextgrabError::Engine("empty TSV output".into()))?;
    let conf_column = header
        .split('\t')
        .position(|name| name.trim() == "conf")
        .ok_or_else(|| TextgrabError::Engine("TSV output has no conf column".into()))?;

    let mut confidences = Vec::new();
    for line in lines {
        match line.split('\t').nth(conf_column).map(|c| c.trim().parse::<f32>()) {
            Some(Ok(conf)) => confidences.push(conf),
            Some(Err(_)) => warn!(line, "Unparseable confidence in TSV row"),
            None => {}
        }
    }
    Ok(confidences)
}

/// Language codes from `--list-langs`, without `osd`, sorted.
fn parse_language_list(output: &str) -> Vec<String> {
    let mut languages: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
        .filter(|line| !line.contains(' '))
        .filter(|line| *line != "osd")
        .map(str::to_string)
        .collect();
    languages.sort();
    languages.dedup();
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t\n\
2\t1\t1\t0\t0\t0\t10\t10\t300\t40\t-1\t\n\
5\t1\t1\t1\t1\t1\t10\t10\t120\t40\t96.060577\tHello\n\
5\t1\t1\t1\t1\t2\t140\t10\t160\t40\t91.5\tworld\n";

    #[test]
    fn tsv_confidences_keep_sentinels() {
        let confs = parse_tsv_confidences(SAMPLE_TSV).unwrap();
        assert_eq!(confs.len(), 4);
        assert_eq!(confs[0], -1.0);
        assert!((confs[2] - 96.060577).abs() < 1e-4);
        let result = OcrResult::new("Hello world".into(), confs);
        assert!((result.average_confidence() - 93.78029).abs() < 1e-3);
    }

    #[test]
    fn tsv_without_conf_column_is_error() {
        assert!(parse_tsv_confidences("level\ttext\n1\tx\n").is_err());
        assert!(parse_tsv_confidences("").is_err());
    }

    #[test]
    fn language_list_drops_osd_and_sorts() {
        let output = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (4):\nspa\neng\nosd\ndeu\n";
        assert_eq!(parse_language_list(output), vec!["deu", "eng", "spa"]);
        assert!(parse_language_list("").is_empty());
    }

    #[test]
    fn recognition_args_order() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([0])));
        let request = OcrRequest {
            image: &image,
            language: Some("deu"),
            page_seg_mode: PageSegMode::new(6).unwrap(),
            engine_mode: EngineMode::LSTM,
        };
        let args = recognition_args(Path::new("/tmp/x.png"), &request, Some("tsv"));
        assert_eq!(
            args,
            vec!["/tmp/x.png", "stdout", "--oem", "1", "--psm", "6", "-l", "deu", "tsv"]
        );
    }

    #[test]
    fn detection_pass_omits_language() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([0])));
        let request = OcrRequest {
            image: &image,
            language: None,
            page_seg_mode: PageSegMode::SINGLE_LINE,
            engine_mode: EngineMode::default(),
        };
        let args = recognition_args(Path::new("a.png"), &request, None);
        assert!(!args.contains(&"-l".to_string()));
        assert_eq!(args[5], "7");
    }

    #[test]
    fn explicit_missing_executable_is_engine_missing() {
        let err = TesseractConfig::locate(Some(Path::new("/nonexistent/bin/tesseract")))
            .err()
            .unwrap();
        assert!(matches!(err, TextgrabError::EngineMissing(_)));
    }

    #[test]
    fn unrunnable_executable_is_engine_missing() {
        let engine = TesseractEngine::new(TesseractConfig {
            executable: PathBuf::from("/nonexistent/bin/tesseract"),
        });
        assert!(matches!(
            engine.version().err().unwrap(),
            TextgrabError::EngineMissing(_)
        ));
    }
}
