// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paginated text PDFs with `printpdf` 0.8.
//
// printpdf 0.8 is data-oriented: each page is a `PdfPage` holding a `Vec<Op>`,
// and the document is serialised with `PdfDocument::save()`.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use textgrab_core::error::TextgrabError;
use textgrab_core::types::PaperSize;
use tracing::{debug, info, instrument, warn};

use crate::pdf::layout::wrap_text;

const FONT_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_PT: f32 = 14.0;
const MARGIN_MM: f32 = 20.0;

/// Lays recognized text out on Helvetica pages.
pub struct PdfWriter {
    paper_size: PaperSize,
    title: String,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: "OCR Results".into(),
        }
    }

    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Characters that fit on one line, estimated from Helvetica's average
    /// glyph width (about half the font size).
    fn chars_per_line(&self) -> usize {
        let (page_w, _) = self.page_dimensions();
        let usable_width_mm = page_w.0 - 2.0 * MARGIN_MM;
        let avg_char_width_mm = 0.50 * FONT_SIZE_PT * 0.3528;
        ((usable_width_mm / avg_char_width_mm) as usize).max(1)
    }

    /// Render `text` as PDF bytes. Long lines wrap and pages break
    /// automatically; empty text gives one blank page.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn create_from_text(&self, text: &str) -> Result<Vec<u8>, TextgrabError> {
        let (page_w, page_h) = self.page_dimensions();
        info!(paper = ?self.paper_size, title = %self.title, "Creating text PDF");

        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let lines_per_page = (((page_h_pt - 2.0 * margin_pt) / LINE_HEIGHT_PT) as usize).max(1);
        let lines = wrap_text(text, self.chars_per_line());

        let mut pages: Vec<PdfPage> = lines
            .chunks(lines_per_page)
            .map(|chunk| {
                let mut ops = Vec::with_capacity(chunk.len() * 5);
                for (idx, line) in chunk.iter().enumerate() {
                    let y_pt = page_h_pt - margin_pt - idx as f32 * LINE_HEIGHT_PT;
                    ops.push(Op::StartTextSection);
                    ops.push(Op::SetTextCursor {
                        pos: Point {
                            x: Pt(margin_pt),
                            y: Pt(y_pt),
                        },
                    });
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(FONT_SIZE_PT),
                        font: BuiltinFont::Helvetica,
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(line.clone())],
                        font: BuiltinFont::Helvetica,
                    });
                    ops.push(Op::EndTextSection);
                }
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();
        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(pages);
        debug!(lines = lines.len(), pages = doc.pages.len(), "Text layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }
        Ok(output)
    }
}
