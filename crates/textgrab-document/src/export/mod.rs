// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export of recognized text to txt, PDF, DOCX, RTF and HTML.
//
// Every format is rendered completely in memory first, then written to a
// temporary file next to the destination and renamed over it. A failed
// export never leaves a partial file behind.

#[cfg(feature = "docx")]
pub mod docx;

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;
use textgrab_core::error::TextgrabError;
use textgrab_core::types::{ExportFormat, ExportTarget, PaperSize};
use tracing::{debug, info, instrument};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional export backends. Each flag is only honoured when the matching
/// cargo feature is compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backends {
    pub printpdf: bool,
    pub lopdf: bool,
    pub docx: bool,
}

impl Backends {
    /// Everything this build was compiled with.
    pub fn compiled() -> Self {
        Self {
            printpdf: cfg!(feature = "pdf-printpdf"),
            lopdf: cfg!(feature = "pdf-lopdf"),
            docx: cfg!(feature = "docx"),
        }
    }

    /// No optional backends: only txt, RTF and HTML work.
    pub fn none() -> Self {
        Self {
            printpdf: false,
            lopdf: false,
            docx: false,
        }
    }

    fn restrict(self, allowed: Backends) -> Self {
        Self {
            printpdf: self.printpdf && allowed.printpdf,
            lopdf: self.lopdf && allowed.lopdf,
            docx: self.docx && allowed.docx,
        }
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        match format {
            ExportFormat::Pdf => self.printpdf || self.lopdf,
            ExportFormat::Docx => self.docx,
            ExportFormat::Text | ExportFormat::Rtf | ExportFormat::Html => true,
        }
    }
}

impl Default for Backends {
    fn default() -> Self {
        Self::compiled()
    }
}

/// Renders and writes export documents.
#[derive(Debug, Clone)]
pub struct Exporter {
    paper_size: PaperSize,
    backends: Backends,
}

impl Exporter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            backends: Backends::compiled(),
        }
    }

    /// Limit which optional backends are used, e.g. to force the lopdf PDF
    /// generator.
    pub fn with_backends(mut self, allowed: Backends) -> Self {
        self.backends = Backends::compiled().restrict(allowed);
        self
    }

    /// Write `text` to the target, returning the final path.
    #[instrument(skip(self, text), fields(path = %target.path.display(), format = %target.format))]
    pub fn export(&self, text: &str, target: &ExportTarget) -> Result<PathBuf, TextgrabError> {
        let bytes = self.render(text, target.format, Local::now())?;
        write_atomically(&target.path, &bytes)?;
        info!(bytes = bytes.len(), "Exported to {}", target.path.display());
        Ok(target.path.clone())
    }

    /// Render `text` in `format` without touching the filesystem.
    pub fn render(
        &self,
        text: &str,
        format: ExportFormat,
        generated: DateTime<Local>,
    ) -> Result<Vec<u8>, TextgrabError> {
        if text.trim().is_empty() {
            return Err(TextgrabError::Export("no text to export".into()));
        }
        if !self.backends.supports(format) {
            return Err(missing_backend(format));
        }
        let stamp = generated.format(TIMESTAMP_FORMAT).to_string();
        match format {
            ExportFormat::Text => Ok(text.as_bytes().to_vec()),
            ExportFormat::Html => Ok(render_html(text, &stamp).into_bytes()),
            ExportFormat::Rtf => Ok(render_rtf(text).into_bytes()),
            ExportFormat::Pdf => self.render_pdf(text),
            ExportFormat::Docx => self.render_docx(text, &stamp),
        }
    }

    fn render_pdf(&self, text: &str) -> Result<Vec<u8>, TextgrabError> {
        #[cfg(feature = "pdf-printpdf")]
        if self.backends.printpdf {
            debug!("Rendering PDF with printpdf");
            return crate::pdf::writer::PdfWriter::new(self.paper_size).create_from_text(text);
        }
        #[cfg(feature = "pdf-lopdf")]
        if self.backends.lopdf {
            debug!("Rendering PDF with lopdf");
            return crate::pdf::simple::create_from_text(text, self.paper_size);
        }
        let _ = (text, self.paper_size);
        Err(missing_backend(ExportFormat::Pdf))
    }

    fn render_docx(&self, text: &str, stamp: &str) -> Result<Vec<u8>, TextgrabError> {
        #[cfg(feature = "docx")]
        if self.backends.docx {
            return docx::render(text, stamp);
        }
        let _ = (text, stamp);
        Err(missing_backend(ExportFormat::Docx))
    }
}

/// The optional libraries that would have produced `format`.
fn missing_backend(format: ExportFormat) -> TextgrabError {
    let (name, libraries) = match format {
        ExportFormat::Docx => ("DOCX", "zip (feature docx)"),
        _ => ("PDF", "printpdf (feature pdf-printpdf) or lopdf (feature pdf-lopdf)"),
    };
    TextgrabError::MissingDependency {
        format: name.into(),
        libraries: libraries.into(),
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(PaperSize::Letter)
    }
}

// -- Text formats -------------------------------------------------------------

/// Standalone HTML page with the text in a pre-wrapped block.
pub fn render_html(text: &str, generated: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>OCR Results</title>
    <meta charset="utf-8">
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .header {{ color: #333; border-bottom: 2px solid #ddd; padding-bottom: 10px; }}
        .content {{ white-space: pre-wrap; margin-top: 20px; }}
        .timestamp {{ color: #666; font-size: 0.9em; }}
    </style>
</head>
<body>
    <h1 class="header">OCR Results</h1>
    <p class="timestamp">Generated: {generated}</p>
    <div class="content">{body}</div>
</body>
</html>"#,
        generated = generated,
        body = html_escape::encode_text(text),
    )
}

/// RTF body text: control characters escaped, newlines as paragraph breaks,
/// non-ASCII as `\uN?` UTF-16 units.
pub fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\par "),
            '\r' => {}
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF takes signed 16-bit values.
                    let _ = write!(out, "\\u{}?", *unit as i16);
                }
            }
        }
    }
    out
}

pub fn render_rtf(text: &str) -> String {
    format!(
        "{{\\rtf1\\ansi\\deff0 {{\\fonttbl {{\\f0 Times New Roman;}}}}\\f0\\fs24 {}}}",
        escape_rtf(text)
    )
}

// -- Output -------------------------------------------------------------------

/// Write through a sibling temporary file and rename it into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), TextgrabError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|err| TextgrabError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn html_escapes_markup() {
        let html = render_html("A & B <C>", "now");
        assert!(html.contains("A &amp; B &lt;C&gt;"));
        assert!(html.contains("white-space: pre-wrap"));
        assert!(html.contains("<title>OCR Results</title>"));
    }

    #[test]
    fn rtf_escapes_and_breaks() {
        assert_eq!(escape_rtf("a\\b{c}\nd"), "a\\\\b\\{c\\}\\par d");
        assert_eq!(escape_rtf("é"), "\\u233?");
        assert_eq!(escape_rtf("😀"), "\\u-10179?\\u-8704?");
    }

    #[test]
    fn rtf_document_shape() {
        let rtf = render_rtf("hi");
        assert!(rtf.starts_with("{\\rtf1\\ansi\\deff0 {\\fonttbl {\\f0 Times New Roman;}}\\f0\\fs24 hi"));
        assert!(rtf.ends_with('}'));
    }

    #[test]
    fn text_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let text = "line one\nline two ü\n";
        Exporter::default()
            .export(text, &ExportTarget::new(&path, ExportFormat::Text))
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn html_render_includes_timestamp() {
        let bytes = Exporter::default()
            .render("x", ExportFormat::Html, stamp())
            .unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("Generated: 2026-03-04 05:06:07"));
    }

    #[test]
    fn missing_backend_errors_without_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let exporter = Exporter::default().with_backends(Backends::none());
        let err = exporter
            .export("some text", &ExportTarget::new(&path, ExportFormat::Pdf))
            .unwrap_err();
        assert!(matches!(err, TextgrabError::MissingDependency { .. }));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        assert!(err.to_string().contains("printpdf (feature pdf-printpdf) or lopdf (feature pdf-lopdf)"));

        let err = exporter
            .export("some text", &ExportTarget::new(dir.path().join("out.docx"), ExportFormat::Docx))
            .unwrap_err();
        assert!(matches!(err, TextgrabError::MissingDependency { .. }));
        assert!(err.to_string().starts_with("DOCX export requires zip (feature docx)"));
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = Exporter::default()
            .render("  \n", ExportFormat::Text, stamp())
            .unwrap_err();
        assert!(matches!(err, TextgrabError::Export(_)));
    }

    #[test]
    fn backend_support_per_format() {
        let none = Backends::none();
        assert!(none.supports(ExportFormat::Text));
        assert!(none.supports(ExportFormat::Rtf));
        assert!(none.supports(ExportFormat::Html));
        assert!(!none.supports(ExportFormat::Pdf));
        assert!(!none.supports(ExportFormat::Docx));
        let lopdf_only = Backends {
            lopdf: true,
            ..Backends::none()
        };
        assert!(lopdf_only.supports(ExportFormat::Pdf));
    }

    #[test]
    fn tesseract_page_breaks_export_in_every_format() {
        let text = "Hello world\n\x0c";
        let exporter = Exporter::default();
        for format in ExportFormat::ALL {
            if !Backends::compiled().supports(format) {
                continue;
            }
            let bytes = exporter.render(text, format, stamp()).unwrap();
            assert!(!bytes.is_empty(), "{format} rendered nothing");
        }
        let rtf = String::from_utf8(exporter.render(text, ExportFormat::Rtf, stamp()).unwrap()).unwrap();
        assert!(rtf.contains("Hello world\\par "));
    }

    #[cfg(feature = "pdf-lopdf")]
    #[test]
    fn lopdf_fallback_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let only_lopdf = Backends {
            lopdf: true,
            ..Backends::none()
        };
        Exporter::new(PaperSize::A4)
            .with_backends(only_lopdf)
            .export("fallback text", &ExportTarget::new(&path, ExportFormat::Pdf))
            .unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[cfg(feature = "docx")]
    #[test]
    fn docx_export_writes_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        Exporter::default()
            .export("word text", &ExportTarget::new(&path, ExportFormat::Docx))
            .unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
    }
}
