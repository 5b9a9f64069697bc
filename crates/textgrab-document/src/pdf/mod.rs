// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF input (text layers, embedded images, page rendering) and text PDF
// output.

pub mod layout;
pub mod reader;
pub mod render;
#[cfg(feature = "pdf-lopdf")]
pub mod simple;
#[cfg(feature = "pdf-printpdf")]
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use reader::PdfReader;
#[cfg(feature = "pdf-printpdf")]
pub use writer::PdfWriter;
