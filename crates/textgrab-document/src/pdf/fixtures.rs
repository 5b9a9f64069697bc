// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory PDF fixtures for reader and pipeline tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// An embedded image to place on a fixture page.
pub enum FixtureImage {
    /// Uncompressed 8-bit DeviceGray filled with `value`.
    Gray { width: u32, height: u32, value: u8 },
    /// Flate-compressed 8-bit DeviceRGB gradient.
    FlateRgb { width: u32, height: u32 },
    /// 1-bit DeviceGray, alternating white/black columns starting white.
    Bilevel { width: u32, height: u32 },
    /// JPEG 2000 stream, which the reader does not decode.
    Jpx,
    /// DCT stream whose bytes are not a JPEG.
    BrokenJpeg,
}

pub struct FixturePage {
    pub text: Option<String>,
    pub images: Vec<FixtureImage>,
}

impl FixturePage {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.into()),
            images: Vec::new(),
        }
    }

    pub fn images(images: Vec<FixtureImage>) -> Self {
        Self { text: None, images }
    }
}

fn image_stream(image: &FixtureImage) -> Stream {
    match *image {
        FixtureImage::Gray {
            width,
            height,
            value,
        } => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![value; (width * height) as usize],
        ),
        FixtureImage::FlateRgb { width, height } => {
            let samples: Vec<u8> = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
            let mut stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                samples,
            );
            stream.compress().expect("fixture compression");
            stream
        }
        FixtureImage::Bilevel { width, height } => {
            let row_bytes = width.div_ceil(8) as usize;
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 1,
                },
                vec![0b1010_1010; row_bytes * height as usize],
            )
        }
        FixtureImage::Jpx => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 8,
                "Height" => 8,
                "Filter" => "JPXDecode",
            },
            vec![0u8; 16],
        ),
        FixtureImage::BrokenJpeg => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 8,
                "Height" => 8,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            b"\xff\xd8 truncated".to_vec(),
        ),
    }
}

/// Serialize a document with the given pages.
pub fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        let mut xobjects = lopdf::Dictionary::new();

        for (i, image) in page.images.iter().enumerate() {
            let name = format!("Im{}", i + 1);
            let id = doc.add_object(image_stream(image));
            xobjects.set(name.clone(), id);
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![100.into(), 0.into(), 0.into(), 100.into(), 50.into(), (50 + 120 * i as i64).into()],
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }

        if let Some(text) = &page.text {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![72.into(), 700.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("fixture content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
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

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture save");
    bytes
}
