// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `textgrab languages`

use textgrab_core::error::Result;
use textgrab_document::scan::OcrBackend;
use textgrab_document::scan::language::available_languages;

use super::Context;

pub fn run(ctx: &Context) -> Result<bool> {
    let engine = ctx.engine.require()?;
    match engine.version() {
        Ok(version) => println!("{version} ({})", engine.executable().display()),
        Err(err) => eprintln!("Could not read the Tesseract version: {err}"),
    }
    for language in available_languages(engine) {
        println!("{language}");
    }
    Ok(true)
}
