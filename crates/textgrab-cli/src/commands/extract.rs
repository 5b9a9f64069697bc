// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `textgrab extract <FILE>`

use textgrab_core::error::Result;
use textgrab_core::human_errors::FailureKind;
use textgrab_core::types::DocumentType;
use textgrab_document::OcrPipeline;
use tracing::instrument;

use super::{Context, output};
use crate::cli::ExtractArgs;

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn run(args: &ExtractArgs, ctx: &Context) -> Result<bool> {
    let mut settings = ctx.config.ocr.clone();
    args.ocr.apply(&mut settings)?;

    let outcome = match ctx.engine.require() {
        Ok(engine) => OcrPipeline::new(engine, settings).process_path(&args.file),
        Err(err) => {
            let kind = match DocumentType::from_path(&args.file) {
                Some(kind) if kind.is_pdf() => FailureKind::Pdf,
                _ => FailureKind::Image,
            };
            let file_name = args
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| args.file.display().to_string());
            output::failed(kind, &file_name, &err)
        }
    };
    output::finish(&outcome, &args.ocr, &ctx.config)
}
