// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `textgrab paste`: recognize the clipboard image.

use textgrab_core::error::Result;
use textgrab_core::human_errors::FailureKind;
use textgrab_document::OcrPipeline;
use tracing::instrument;

use super::{Context, output};
use crate::cli::OcrArgs;
use crate::services::clipboard;

const CLIPBOARD_NAME: &str = "clipboard";

#[instrument(skip_all)]
pub fn run(args: &OcrArgs, ctx: &Context) -> Result<bool> {
    let mut settings = ctx.config.ocr.clone();
    args.apply(&mut settings)?;

    let outcome = match ctx.engine.require() {
        Ok(engine) => {
            let image = clipboard::read_image()?;
            OcrPipeline::new(engine, settings).process_image(image, CLIPBOARD_NAME)
        }
        Err(err) => output::failed(FailureKind::Image, CLIPBOARD_NAME, &err),
    };
    output::finish(&outcome, args, &ctx.config)
}
