//! Legacy untyped source classification.
//!
//! Older callers hand over one opaque byte blob that is either NUL-terminated path text, symbol
//! text, or a raw image blob, and the variant is guessed from the first byte. Nothing inside the
//! crate uses this; typed constructors on [`ImageSource`] are the supported path.

use std::sync::Arc;

use crate::foundation::error::{ImgpipeError, ImgpipeResult};
use crate::source::blob::{RAW_HEADER_LEN, parse_raw_header};
use crate::source::image_source::{ImageSource, SourceKind};

/// Guess the variant of an untyped source from its first byte.
///
/// Printable ASCII (`0x20..=0x7f`) means a file path, `>= 0x80` means a symbol (symbol
/// codepoints live in a private-use range whose UTF-8 encoding starts high), anything else is an
/// in-memory image blob. Empty input is [`SourceKind::Unknown`].
pub fn classify(raw: &[u8]) -> SourceKind {
    match raw.first().copied() {
        None => SourceKind::Unknown,
        Some(0x20..=0x7f) => SourceKind::File,
        Some(0x80..) => SourceKind::Symbol,
        Some(_) => SourceKind::Buffer,
    }
}

/// Convert an untyped source into an [`ImageSource`] using [`classify`].
///
/// Text variants stop at the first NUL byte. Buffer variants must hold a valid raw blob header
/// and enough pixel bytes for it; the blob bytes are aliased when `raw` is exactly one blob.
pub fn parse_legacy(raw: Arc<[u8]>) -> ImgpipeResult<ImageSource> {
    match classify(&raw) {
        SourceKind::Unknown => Err(ImgpipeError::source_unrecognized("empty legacy source")),
        SourceKind::File => ImageSource::file(text_until_nul(&raw)?),
        SourceKind::Symbol => ImageSource::symbol(text_until_nul(&raw)?),
        SourceKind::Buffer => {
            let header = parse_raw_header(&raw)
                .map_err(|e| ImgpipeError::source_unrecognized(e.to_string()))?;
            let len = RAW_HEADER_LEN + header.byte_len();
            if raw.len() < len {
                return Err(ImgpipeError::source_unrecognized(format!(
                    "raw blob truncated: {} of {len} bytes",
                    raw.len()
                )));
            }
            if raw.len() == len {
                Ok(ImageSource::Buffer(raw))
            } else {
                Ok(ImageSource::buffer(&raw[..len]))
            }
        }
    }
}

fn text_until_nul(raw: &[u8]) -> ImgpipeResult<&str> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    std::str::from_utf8(&raw[..end])
        .map_err(|e| ImgpipeError::source_unrecognized(format!("source text is not UTF-8: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/source/legacy.rs"]
mod tests;
