// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal text PDFs written directly with `lopdf`.
//
// Used when the printpdf generator is compiled out. Text goes through the
// standard Helvetica font, so anything outside Latin-1 is replaced by `?`.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use textgrab_core::error::TextgrabError;
use textgrab_core::types::PaperSize;
use tracing::{debug, instrument};

use crate::pdf::layout::wrap_text;

const FONT_SIZE: i64 = 10;
const LINE_HEIGHT: f32 = 12.0;
const MARGIN: f32 = 56.0;
const MM_TO_PT: f32 = 72.0 / 25.4;

/// Latin-1 bytes for `text`; other characters become `?`.
pub fn latin1_lossy(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Render `text` onto as many pages as it needs.
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn create_from_text(text: &str, paper_size: PaperSize) -> Result<Vec<u8>, TextgrabError> {
    let (w_mm, h_mm) = paper_size.dimensions_mm();
    let (width, height) = (w_mm as f32 * MM_TO_PT, h_mm as f32 * MM_TO_PT);
    // Helvetica averages about half an em per glyph.
    let chars_per_line = ((width - 2.0 * MARGIN) / (FONT_SIZE as f32 * 0.5)) as usize;
    let lines_per_page = (((height - 2.0 * MARGIN) / LINE_HEIGHT) as usize).max(1);
    let lines = wrap_text(text, chars_per_line);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut chunks: Vec<&[String]> = lines.chunks(lines_per_page).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    let mut kids = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LINE_HEIGHT.into()]),
            Operation::new("Td", vec![MARGIN.into(), (height - MARGIN).into()]),
        ];
        for line in chunk {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(latin1_lossy(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let encoded = Content { operations }
            .encode()
            .map_err(|err| TextgrabError::Export(format!("cannot encode PDF content: {err}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| TextgrabError::Export(format!("cannot serialise PDF: {err}")))?;
    debug!(pages = count, bytes = bytes.len(), "Simple PDF written");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_characters_outside_latin1() {
        assert_eq!(latin1_lossy("café €5"), b"caf\xe9 ?5".to_vec());
    }

    #[test]
    fn text_round_trips_through_reader() {
        let bytes = create_from_text("Hello there\nSecond line", PaperSize::A4).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Hello there"));
    }

    #[test]
    fn paginates_long_text() {
        let text = "row\n".repeat(300);
        let bytes = create_from_text(&text, PaperSize::Letter).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 4);
    }
}
