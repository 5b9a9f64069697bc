// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printing and exporting a recognition outcome.

use std::path::PathBuf;

use chrono::Local;
use textgrab_core::AppConfig;
use textgrab_core::error::{Result, TextgrabError};
use textgrab_core::human_errors::FailureKind;
use textgrab_core::report::{FailureReport, Outcome};
use textgrab_core::types::{ExportFormat, ExportTarget};
use textgrab_document::Exporter;
use tracing::{info, warn};

use crate::cli::OcrArgs;

/// Outcome for a call that could not reach the engine.
pub fn failed(kind: FailureKind, file_name: &str, err: &TextgrabError) -> Outcome {
    Outcome::Failed(FailureReport {
        kind,
        file_name: file_name.to_string(),
        error: err.to_string(),
    })
}

/// Export destination: `--output`, or a quick-save name in the output directory.
pub fn export_target(
    format: ExportFormat,
    output: Option<PathBuf>,
    config: &AppConfig,
) -> ExportTarget {
    match output {
        Some(path) => ExportTarget::new(path, format),
        None => ExportTarget::quick_save(&config.output_dir(), format, Local::now()),
    }
}

/// Print the outcome and export it when asked. Returns whether the
/// recognition succeeded.
pub fn finish(outcome: &Outcome, args: &OcrArgs, config: &AppConfig) -> Result<bool> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        println!("{}", outcome.render());
    }

    if outcome.is_failure() {
        return Ok(false);
    }

    if let Some(format) = args.export {
        let target = export_target(format, args.output.clone(), config);
        let path = Exporter::new(config.export.paper_size).export(&outcome.render(), &target);
        match path {
            Ok(path) => {
                info!(path = %path.display(), "Export complete");
                eprintln!("Exported to {}", path.display());
            }
            Err(err) => {
                warn!(%err, "Export failed");
                return Err(err);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn explicit_output_is_used() {
        let target = export_target(
            ExportFormat::Rtf,
            Some("out/notes.rtf".into()),
            &AppConfig::default(),
        );
        assert_eq!(target.path, Path::new("out/notes.rtf"));
        assert_eq!(target.format, ExportFormat::Rtf);
    }

    #[test]
    fn quick_save_goes_to_output_dir() {
        let mut config = AppConfig::default();
        config.export.output_dir = Some("/tmp/exports".into());
        let target = export_target(ExportFormat::Html, None, &config);
        assert!(target.path.starts_with("/tmp/exports"));
        let name = target.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("ocr_results_") && name.ends_with(".html"));
    }
}
