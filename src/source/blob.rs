//! Raw image blob format: a 4-byte little-endian header word followed by tightly packed rows.
//!
//! Header bits: `0..5` color format code, `5..8` always zero, `8..10` reserved, `10..21` width,
//! `21..32` height. Because the format code is below `0x20`, the first byte of a blob never looks
//! like printable text.

use crate::foundation::core::{ColorFormat, ImageHeader};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};

/// Size of the blob header in bytes.
pub const RAW_HEADER_LEN: usize = 4;

/// Largest width or height a blob header can carry.
pub const RAW_MAX_DIM: u32 = (1 << 11) - 1;

/// Decode the header at the start of `bytes`.
pub fn parse_raw_header(bytes: &[u8]) -> ImgpipeResult<ImageHeader> {
    let Some(word) = bytes.get(..RAW_HEADER_LEN) else {
        return Err(ImgpipeError::validation(format!(
            "raw blob needs a {RAW_HEADER_LEN}-byte header, got {} bytes",
            bytes.len()
        )));
    };
    let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);

    if (word >> 5) & 0b111 != 0 {
        return Err(ImgpipeError::validation(
            "raw blob header has non-zero marker bits",
        ));
    }
    let code = (word & 0x1f) as u8;
    let cf = match ColorFormat::from_code(code) {
        Some(ColorFormat::Unknown) | None => {
            return Err(ImgpipeError::validation(format!(
                "raw blob color format code {code} is not supported"
            )));
        }
        Some(cf) => cf,
    };
    let w = (word >> 10) & RAW_MAX_DIM;
    let h = (word >> 21) & RAW_MAX_DIM;
    Ok(ImageHeader::new(w, h, cf))
}

/// Encode `header` as a blob header word.
pub fn encode_raw_header(header: &ImageHeader) -> ImgpipeResult<[u8; RAW_HEADER_LEN]> {
    if header.cf == ColorFormat::Unknown {
        return Err(ImgpipeError::validation(
            "raw blob color format must be known",
        ));
    }
    if header.w > RAW_MAX_DIM || header.h > RAW_MAX_DIM {
        return Err(ImgpipeError::validation(format!(
            "raw blob dimensions {}x{} exceed {RAW_MAX_DIM}",
            header.w, header.h
        )));
    }
    let word = u32::from(header.cf.code()) | (header.w << 10) | (header.h << 21);
    Ok(word.to_le_bytes())
}

/// Build a complete blob from a header and tightly packed pixel bytes.
pub fn encode_raw_blob(header: ImageHeader, pixels: &[u8]) -> ImgpipeResult<Vec<u8>> {
    if pixels.len() != header.byte_len() {
        return Err(ImgpipeError::validation(format!(
            "raw blob pixel data is {} bytes, header needs {}",
            pixels.len(),
            header.byte_len()
        )));
    }
    let mut out = Vec::with_capacity(RAW_HEADER_LEN + pixels.len());
    out.extend_from_slice(&encode_raw_header(&header)?);
    out.extend_from_slice(pixels);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/source/blob.rs"]
mod tests;
