use super::*;

#[test]
fn header_bit_layout() {
    let h = ImageHeader::new(3, 2, ColorFormat::NativeAlpha);
    let bytes = encode_raw_header(&h).unwrap();
    let word = u32::from_le_bytes(bytes);
    assert_eq!(word & 0x1f, 5);
    assert_eq!((word >> 10) & 0x7ff, 3);
    assert_eq!(word >> 21, 2);
    assert!(bytes[0] < 0x20);
    assert_eq!(parse_raw_header(&bytes).unwrap(), h);
}

#[test]
fn max_dimensions_fit() {
    let h = ImageHeader::new(RAW_MAX_DIM, RAW_MAX_DIM, ColorFormat::Alpha8);
    let bytes = encode_raw_header(&h).unwrap();
    assert_eq!(parse_raw_header(&bytes).unwrap(), h);

    let too_big = ImageHeader::new(RAW_MAX_DIM + 1, 1, ColorFormat::Native);
    assert!(encode_raw_header(&too_big).is_err());
}

#[test]
fn rejects_bad_headers() {
    assert!(parse_raw_header(&[4, 0]).is_err());
    // marker bits set
    assert!(parse_raw_header(&[0x24, 0, 0, 0]).is_err());
    // unknown format code
    assert!(parse_raw_header(&[0, 0x04, 0, 0]).is_err());
    assert!(parse_raw_header(&[7, 0x04, 0, 0]).is_err());
}

#[test]
fn blob_requires_exact_pixel_len() {
    let h = ImageHeader::new(2, 2, ColorFormat::Alpha8);
    let blob = encode_raw_blob(h, &[1, 2, 3, 4]).unwrap();
    assert_eq!(blob.len(), RAW_HEADER_LEN + 4);
    assert_eq!(&blob[RAW_HEADER_LEN..], &[1, 2, 3, 4]);
    assert!(encode_raw_blob(h, &[1, 2, 3]).is_err());
}
