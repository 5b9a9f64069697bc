// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word (.docx) output: a minimal WordprocessingML package assembled with `zip`.

use std::io::{Cursor, Write};

use textgrab_core::error::TextgrabError;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:rPr><w:sz w:val="56"/></w:rPr></w:style>
</w:styles>"#;

/// Whether XML 1.0 allows `c` in character data. The form feed Tesseract
/// writes after each page is not allowed.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

/// XML text content with markup escaped and illegal characters dropped.
fn xml_text(text: &str) -> String {
    let legal: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    html_escape::encode_text(&legal).into_owned()
}

/// One run per line, joined by `<w:br/>`.
fn runs_with_breaks(text: &str) -> String {
    text.lines()
        .map(|line| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, xml_text(line)))
        .collect::<Vec<_>>()
        .join("<w:r><w:br/></w:r>")
}

fn document_xml(text: &str, generated: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>OCR Results</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">Generated: {generated}</w:t></w:r></w:p>"#,
            r#"<w:p>{runs}</w:p>"#,
            r#"</w:body></w:document>"#
        ),
        generated = xml_text(generated),
        runs = runs_with_breaks(text),
    )
}

/// Package `text` as a .docx with a title, timestamp and the text body.
pub fn render(text: &str, generated: &str) -> Result<Vec<u8>, TextgrabError> {
    let zip_err = |err: zip::result::ZipError| TextgrabError::Export(format!("cannot build DOCX: {err}"));
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/styles.xml", STYLES.to_string()),
        ("word/document.xml", document_xml(text, generated)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish().map_err(zip_err)?.into_inner())
}
