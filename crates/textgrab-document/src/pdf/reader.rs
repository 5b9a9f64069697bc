// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: page text layers and embedded raster images, using `lopdf`.
//
// Text comes from the content streams; images come from each page's
// /XObject resources and are decoded here for JPEG (DCT), Flate-compressed
// and uncompressed 8-bit gray/RGB samples, and 1-bit gray. Whole pages are
// rasterized through `pdf::render` when a page image is needed.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use textgrab_core::error::TextgrabError;
use tracing::{debug, info, instrument, warn};

use crate::pdf::render;

/// Reads text and images from an existing PDF.
pub struct PdfReader {
    document: Document,
    data: Arc<Vec<u8>>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextgrabError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());
        let data = std::fs::read(path_ref)?;
        Self::from_vec(data).map_err(|err| match err {
            TextgrabError::PdfError(msg) => {
                TextgrabError::PdfError(format!("failed to open {}: {}", path_ref.display(), msg))
            }
            other => other,
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, TextgrabError> {
        Self::from_vec(data.to_vec())
    }

    fn from_vec(data: Vec<u8>) -> Result<Self, TextgrabError> {
        let document = Document::load_mem(&data)
            .map_err(|err| TextgrabError::PdfError(format!("failed to load PDF: {err}")))?;
        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self {
            document,
            data: Arc::new(data),
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// 1-indexed page numbers in document order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.document.get_pages().keys().copied().collect()
    }

    // -- Extraction -----------------------------------------------------------

    /// Native text layer of one page (1-indexed).
    #[instrument(skip(self))]
    pub fn page_text(&self, page_number: u32) -> Result<String, TextgrabError> {
        self.document.extract_text(&[page_number]).map_err(|err| {
            TextgrabError::PdfError(format!("text extraction failed on page {page_number}: {err}"))
        })
    }

    /// Every image XObject on one page (1-indexed), decoded. Images that
    /// cannot be decoded are returned as errors in their slot.
    #[instrument(skip(self))]
    pub fn page_images(
        &self,
        page_number: u32,
    ) -> Result<Vec<Result<DynamicImage, TextgrabError>>, TextgrabError> {
        let page_id = self.page_id(page_number)?;
        let streams = self.image_streams(page_id)?;
        debug!(count = streams.len(), "Image XObjects found");
        Ok(streams
            .into_iter()
            .map(|stream| decode_image(&self.document, stream))
            .collect())
    }

    /// Rasterize one page (1-indexed). A scale of 1.0 is 72 dpi.
    pub fn render_page(&self, page_number: u32, scale: f32) -> Result<DynamicImage, TextgrabError> {
        let index = (page_number as usize).checked_sub(1).ok_or_else(|| {
            TextgrabError::PdfError("page numbers start at 1".into())
        })?;
        render::render_page(Arc::clone(&self.data), index, scale)
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId, TextgrabError> {
        self.document
            .get_pages()
            .get(&page_number)
            .copied()
            .ok_or_else(|| {
                TextgrabError::PdfError(format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    self.page_count()
                ))
            })
    }

    /// Resolve a possibly indirect object.
    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, TextgrabError> {
        self.document
            .dereference(object)
            .map(|(_, obj)| obj)
            .map_err(|err| TextgrabError::PdfError(format!("broken object reference: {err}")))
    }

    /// The page's /Resources, inherited from ancestors when absent.
    fn page_resources(&self, page_id: ObjectId) -> Result<Option<&Dictionary>, TextgrabError> {
        let mut node = self.document.get_dictionary(page_id).map_err(|err| {
            TextgrabError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;
        // Bounded walk up the page tree.
        for _ in 0..32 {
            if let Ok(resources) = node.get(b"Resources") {
                return Ok(self.resolve(resources)?.as_dict().ok());
            }
            match node.get(b"Parent") {
                Ok(parent) => match self.resolve(parent)?.as_dict() {
                    Ok(dict) => node = dict,
                    Err(_) => return Ok(None),
                },
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn image_streams(&self, page_id: ObjectId) -> Result<Vec<&Stream>, TextgrabError> {
        let Some(resources) = self.page_resources(page_id)? else {
            return Ok(Vec::new());
        };
        let xobjects = match resources.get(b"XObject") {
            Ok(obj) => match self.resolve(obj)?.as_dict() {
                Ok(dict) => dict,
                Err(_) => return Ok(Vec::new()),
            },
            Err(_) => return Ok(Vec::new()),
        };

        let mut streams = Vec::new();
        for (name, obj) in xobjects.iter() {
            let stream = match self.resolve(obj).map(Object::as_stream) {
                Ok(Ok(stream)) => stream,
                _ => {
                    warn!(name = %String::from_utf8_lossy(name), "XObject is not a stream");
                    continue;
                }
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|subtype| subtype == b"Image")
                .unwrap_or(false);
            if is_image {
                streams.push(stream);
            }
        }
        Ok(streams)
    }
}

// -- Image decoding -----------------------------------------------------------

fn unsupported(detail: impl std::fmt::Display) -> TextgrabError {
    TextgrabError::PdfError(format!("unsupported embedded image: {detail}"))
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32, TextgrabError> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| unsupported(format!("missing /{}", String::from_utf8_lossy(key))))
}

/// Filter names, outermost first.
fn filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Number of colour components, when the colour space is one we decode.
fn components(document: &Document, dict: &Dictionary) -> Result<u8, TextgrabError> {
    if dict
        .get(b"ImageMask")
        .and_then(Object::as_bool)
        .unwrap_or(false)
    {
        return Ok(1);
    }
    let color_space = dict
        .get(b"ColorSpace")
        .and_then(|obj| document.dereference(obj))
        .map(|(_, obj)| obj);
    match color_space {
        Ok(Object::Name(name)) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Ok(1),
            b"DeviceRGB" | b"CalRGB" => Ok(3),
            other => Err(unsupported(format!(
                "colour space {}",
                String::from_utf8_lossy(other)
            ))),
        },
        Ok(Object::Array(items)) => {
            let family = items
                .first()
                .and_then(|o| o.as_name().ok())
                .unwrap_or_default();
            match family {
                b"CalGray" => Ok(1),
                b"CalRGB" => Ok(3),
                b"ICCBased" => items
                    .get(1)
                    .and_then(|o| document.dereference(o).ok())
                    .and_then(|(_, o)| o.as_stream().ok())
                    .and_then(|s| s.dict.get(b"N").and_then(Object::as_i64).ok())
                    .ok_or_else(|| unsupported("ICCBased colour space without /N"))
                    .and_then(|n| {
                        u8::try_from(n)
                            .map_err(|_| unsupported(format!("ICCBased colour space with /N {n}")))
                    }),
                other => Err(unsupported(format!(
                    "colour space {}",
                    String::from_utf8_lossy(other)
                ))),
            }
        }
        _ => Err(unsupported("missing /ColorSpace")),
    }
}

fn decode_image(document: &Document, stream: &Stream) -> Result<DynamicImage, TextgrabError> {
    let dict = &stream.dict;
    let filters = filters(dict);

    if let Some(last) = filters.last() {
        match last.as_slice() {
            b"DCTDecode" if filters.len() == 1 => {
                return image::load_from_memory(&stream.content)
                    .map_err(|err| TextgrabError::ImageError(format!("bad JPEG stream: {err}")));
            }
            b"FlateDecode" | b"LZWDecode" => {}
            other => {
                return Err(unsupported(format!(
                    "filter {}",
                    String::from_utf8_lossy(other)
                )));
            }
        }
    }

    let width = dict_u32(dict, b"Width")?;
    let height = dict_u32(dict, b"Height")?;
    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(1);
    let components = components(document, dict)?;

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|err| TextgrabError::PdfError(format!("cannot decompress image: {err}")))?
    };

    samples_to_image(&data, width, height, components, bits)
}

/// Build an image from raw samples.
fn samples_to_image(
    data: &[u8],
    width: u32,
    height: u32,
    components: u8,
    bits: i64,
) -> Result<DynamicImage, TextgrabError> {
    let (w, h) = (width as usize, height as usize);
    let pixels = w
        .checked_mul(h)
        .ok_or_else(|| unsupported(format!("{width}x{height} image is too large")))?;
    match (components, bits) {
        (1, 8) => {
            check_len(data, pixels)?;
            GrayImage::from_raw(width, height, data[..pixels].to_vec())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| unsupported("gray sample buffer"))
        }
        (3, 8) => {
            let needed = pixels
                .checked_mul(3)
                .ok_or_else(|| unsupported(format!("{width}x{height} image is too large")))?;
            check_len(data, needed)?;
            RgbImage::from_raw(width, height, data[..needed].to_vec())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| unsupported("RGB sample buffer"))
        }
        (1, 1) => {
            let row_bytes = w.div_ceil(8);
            let needed = row_bytes
                .checked_mul(h)
                .ok_or_else(|| unsupported(format!("{width}x{height} image is too large")))?;
            check_len(data, needed)?;
            Ok(DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
                let byte = data[y as usize * row_bytes + x as usize / 8];
                let bit = (byte >> (7 - (x % 8))) & 1;
                image::Luma([if bit == 1 { 255 } else { 0 }])
            })))
        }
        (c, b) => Err(unsupported(format!("{c} components at {b} bits"))),
    }
}

fn check_len(data: &[u8], needed: usize) -> Result<(), TextgrabError> {
    if data.len() < needed {
        return Err(TextgrabError::PdfError(format!(
            "image data truncated: {} of {} bytes",
            data.len(),
            needed
        )));
    }
    Ok(())
}
