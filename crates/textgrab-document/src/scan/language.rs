// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Language auto-detection.
//
// A quick single-line recognition pass without a language flag produces a
// text sample; `whatlang` identifies its language, and the result is mapped
// to a Tesseract language pack code. The detected language is only used when
// that pack is installed.

use image::DynamicImage;
use textgrab_core::error::TextgrabError;
use textgrab_core::types::{DetectedLanguage, EngineMode, LanguageResolution, OcrSettings, PageSegMode};
use tracing::{debug, info, instrument, warn};
use whatlang::Lang;

use crate::image::processor::ImageProcessor;
use crate::scan::ocr::{OcrBackend, OcrRequest};

/// Used when the engine cannot list its language packs.
pub const FALLBACK_LANGUAGES: [&str; 5] = ["eng", "por", "spa", "fra", "deu"];

/// Longest edge of the low-resolution copy used for the detection pass.
pub const DETECTION_MAX_EDGE: u32 = 1600;

/// Installed language packs, falling back to [`FALLBACK_LANGUAGES`] when the
/// engine reports none or cannot be asked.
pub fn available_languages(backend: &dyn OcrBackend) -> Vec<String> {
    let fallback = || FALLBACK_LANGUAGES.iter().map(|l| l.to_string()).collect();
    match backend.installed_languages() {
        Ok(languages) if !languages.is_empty() => languages,
        Ok(_) => {
            warn!(
                fallback = ?FALLBACK_LANGUAGES,
                "No Tesseract language packs found; install packs for full functionality"
            );
            fallback()
        }
        Err(err) => {
            warn!(%err, fallback = ?FALLBACK_LANGUAGES, "Could not list Tesseract languages");
            fallback()
        }
    }
}

/// Tesseract pack code for a detected language.
///
/// Tesseract names packs by ISO 639-3 code with a few exceptions.
pub fn tesseract_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Cmn => "chi_sim",
        Lang::Pes => "fas",
        Lang::Nob => "nor",
        other => other.code(),
    }
}

/// Identify the language of `sample` as a Tesseract pack code.
pub fn identify(sample: &str) -> Result<&'static str, TextgrabError> {
    let info = whatlang::detect(sample).ok_or_else(|| {
        TextgrabError::LanguageDetection("no language features in sample".into())
    })?;
    debug!(
        lang = info.lang().code(),
        confidence = info.confidence(),
        "Sample language identified"
    );
    Ok(tesseract_code(info.lang()))
}

/// Run the detection pass on `image` and classify the result.
///
/// Failures are folded into [`DetectedLanguage::Failed`]; detection never
/// stops recognition.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn detect_language(
    backend: &dyn OcrBackend,
    image: &DynamicImage,
    engine_mode: EngineMode,
    installed: &[String],
) -> DetectedLanguage {
    let sample_image = ImageProcessor::from_dynamic(image.clone())
        .fit_within(DETECTION_MAX_EDGE)
        .into_dynamic();
    let request = OcrRequest {
        image: &sample_image,
        language: None,
        page_seg_mode: PageSegMode::SINGLE_LINE,
        engine_mode,
    };

    let sample = match backend.image_to_string(&request) {
        Ok(text) => text,
        Err(err) => {
            warn!(%err, "Detection pass failed");
            return DetectedLanguage::Failed(err.to_string());
        }
    };
    let sample = sample.trim();
    if sample.is_empty() {
        debug!("Detection pass produced no text");
        return DetectedLanguage::NoSample;
    }

    match identify(sample) {
        Ok(code) if installed.iter().any(|l| l == code) => {
            info!(code, "Detected language is installed");
            DetectedLanguage::Available(code.to_string())
        }
        Ok(code) => {
            info!(code, "Detected language has no installed pack");
            DetectedLanguage::Unavailable(code.to_string())
        }
        Err(err) => {
            warn!(%err, "Language identification failed");
            DetectedLanguage::Failed(err.to_string())
        }
    }
}

/// Decide which language the full recognition pass uses.
pub fn resolve_language(
    backend: &dyn OcrBackend,
    image: Option<&DynamicImage>,
    settings: &OcrSettings,
    installed: &[String],
) -> LanguageResolution {
    if !settings.auto_detect_language {
        return LanguageResolution::selected_only(&settings.language);
    }
    match image {
        Some(image) => LanguageResolution::from_detection(
            &settings.language,
            detect_language(backend, image, settings.engine_mode, installed),
        ),
        None => {
            debug!("No image to sample; keeping the selected language");
            LanguageResolution::from_detection(&settings.language, DetectedLanguage::NoSample)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::testing::ScriptedBackend;
    use image::{GrayImage, Luma};

    const GERMAN: &str = "Der schnelle braune Fuchs springt über den faulen Hund und läuft dann schnell in den dunklen Wald zurück";
    const FRENCH: &str = "Le renard brun rapide saute par-dessus le chien paresseux et court ensuite dans la forêt sombre";

    fn page() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 20, Luma([255])))
    }

    fn installed(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn special_pack_codes() {
        assert_eq!(tesseract_code(Lang::Cmn), "chi_sim");
        assert_eq!(tesseract_code(Lang::Pes), "fas");
        assert_eq!(tesseract_code(Lang::Nob), "nor");
        assert_eq!(tesseract_code(Lang::Deu), "deu");
    }

    #[test]
    fn installed_detection_is_used() {
        let backend = ScriptedBackend::new().with_detection_text(GERMAN);
        let settings = OcrSettings::default();
        let resolution =
            resolve_language(&backend, Some(&page()), &settings, &installed(&["deu", "eng"]));
        assert_eq!(resolution.detected, DetectedLanguage::Available("deu".into()));
        assert_eq!(resolution.used, "deu");
        assert!(!resolution.fell_back());
    }

    #[test]
    fn missing_pack_keeps_selected_language() {
        let backend = ScriptedBackend::new().with_detection_text(FRENCH);
        let settings = OcrSettings::default();
        let resolution =
            resolve_language(&backend, Some(&page()), &settings, &installed(&["eng", "deu"]));
        assert_eq!(resolution.detected, DetectedLanguage::Unavailable("fra".into()));
        assert_eq!(resolution.used, "eng");
        assert!(resolution.fell_back());
    }

    #[test]
    fn detection_pass_is_single_line_without_language() {
        let backend = ScriptedBackend::new().with_detection_text(GERMAN);
        let mut settings = OcrSettings::default();
        settings.engine_mode = EngineMode::LSTM;
        resolve_language(&backend, Some(&page()), &settings, &installed(&["deu"]));
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].language, None);
        assert_eq!(calls[0].page_seg_mode, 7);
        assert_eq!(calls[0].engine_mode, 1);
    }

    #[test]
    fn detection_sample_is_downscaled() {
        let backend = ScriptedBackend::new().with_detection_text(GERMAN);
        let big = DynamicImage::ImageLuma8(GrayImage::from_pixel(3200, 800, Luma([255])));
        detect_language(&backend, &big, EngineMode::default(), &installed(&["deu"]));
        assert_eq!(backend.calls()[0].size, (1600, 400));
    }

    #[test]
    fn empty_sample_is_no_sample() {
        let backend = ScriptedBackend::new().with_detection_text("  \n");
        let resolution = resolve_language(
            &backend,
            Some(&page()),
            &OcrSettings::default(),
            &installed(&["eng"]),
        );
        assert_eq!(resolution.detected, DetectedLanguage::NoSample);
        assert_eq!(resolution.used, "eng");
    }

    #[test]
    fn engine_error_is_recorded_not_raised() {
        let backend = ScriptedBackend::new().failing_detection("engine crashed");
        let resolution = resolve_language(
            &backend,
            Some(&page()),
            &OcrSettings::default(),
            &installed(&["eng"]),
        );
        assert!(matches!(resolution.detected, DetectedLanguage::Failed(ref r) if r.contains("engine crashed")));
        assert_eq!(resolution.used, "eng");
    }

    #[test]
    fn disabled_detection_skips_engine() {
        let backend = ScriptedBackend::new().with_detection_text(GERMAN);
        let mut settings = OcrSettings::default();
        settings.auto_detect_language = false;
        settings.language = "spa".into();
        let resolution = resolve_language(&backend, Some(&page()), &settings, &installed(&["deu"]));
        assert_eq!(resolution.detected, DetectedLanguage::NotRequested);
        assert_eq!(resolution.used, "spa");
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn fallback_languages_when_listing_empty() {
        let backend = ScriptedBackend::new().with_languages(&[]);
        assert_eq!(available_languages(&backend), FALLBACK_LANGUAGES.to_vec());
        let backend = ScriptedBackend::new().with_languages(&["eng", "ita"]);
        assert_eq!(available_languages(&backend), vec!["eng", "ita"]);
    }
}
