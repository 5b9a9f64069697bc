// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `textgrab export <TEXT_FILE>`: convert saved text without running OCR.

use std::path::Path;

use textgrab_core::AppConfig;
use textgrab_core::error::Result;
use textgrab_core::types::ExportFormat;
use textgrab_document::Exporter;
use tracing::{info, instrument};

use super::output::export_target;
use crate::cli::ExportArgs;

/// `--format`, else the output file's extension, else the configured default.
fn resolve_format(args: &ExportArgs, config: &AppConfig) -> ExportFormat {
    args.format
        .or_else(|| {
            args.output
                .as_deref()
                .and_then(Path::extension)
                .and_then(|ext| ExportFormat::from_extension(&ext.to_string_lossy()))
        })
        .unwrap_or(config.export.default_format)
}

#[instrument(skip_all, fields(file = %args.text_file.display()))]
pub fn run(args: &ExportArgs, config: &AppConfig) -> Result<bool> {
    let text = std::fs::read_to_string(&args.text_file)?;
    let format = resolve_format(args, config);
    let target = export_target(format, args.output.clone(), config);
    let path = Exporter::new(config.export.paper_size).export(&text, &target)?;
    info!(format = %format, "Export complete");
    println!("{}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: Option<ExportFormat>, output: Option<&str>) -> ExportArgs {
        ExportArgs {
            text_file: "in.txt".into(),
            format,
            output: output.map(Into::into),
        }
    }

    #[test]
    fn format_resolution_order() {
        let config = AppConfig::default();
        assert_eq!(
            resolve_format(&args(Some(ExportFormat::Rtf), Some("x.html")), &config),
            ExportFormat::Rtf
        );
        assert_eq!(resolve_format(&args(None, Some("x.html")), &config), ExportFormat::Html);
        assert_eq!(
            resolve_format(&args(None, Some("x.unknown")), &config),
            config.export.default_format
        );
        assert_eq!(resolve_format(&args(None, None), &config), config.export.default_format);
    }

    #[test]
    fn converts_text_file_to_html() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "Fish & <Chips>").unwrap();
        let output = dir.path().join("notes.html");
        let args = ExportArgs {
            text_file: input,
            format: None,
            output: Some(output.clone()),
        };
        assert!(run(&args, &AppConfig::default()).unwrap());
        let html = std::fs::read_to_string(output).unwrap();
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
    }
}
