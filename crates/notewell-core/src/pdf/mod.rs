//! PDF text extraction (lopdf).

mod extractor;

pub use extractor::{extract_text, extract_text_from_bytes, ExtractedDocument};

#[cfg(test)]
pub(crate) use extractor::tests::create_pdf;
