use super::*;

#[test]
fn area_size_and_move() {
    let mut a = Area::from_size(2, 3, 10, 4);
    assert_eq!((a.x2, a.y2), (11, 6));
    assert_eq!((a.width(), a.height()), (10, 4));

    a.move_by(-2, 1);
    assert_eq!(a, Area::new(0, 4, 9, 7));

    a.resize(4, 10);
    assert_eq!((a.width(), a.height()), (4, 10));
    assert!(!a.is_empty());
    assert!(Area::new(5, 5, 4, 5).is_empty());
}

#[test]
fn color32_byte_layout_is_bgra() {
    let c = Color32::hex(0x112233);
    let bytes: [u8; 4] = bytemuck::cast(c);
    assert_eq!(bytes, [0x33, 0x22, 0x11, 0xff]);
}

#[test]
fn color_mix_endpoints_are_exact() {
    let fg = Color32::rgb(200, 10, 0);
    let bg = Color32::rgb(0, 250, 40);
    assert!(Color32::mix(fg, bg, 255).same_rgb(fg));
    assert!(Color32::mix(fg, bg, 0).same_rgb(bg));
}

#[test]
fn color_format_codes_roundtrip_and_alpha() {
    for cf in [
        ColorFormat::Unknown,
        ColorFormat::Native,
        ColorFormat::NativeAlpha,
        ColorFormat::NativeChromaKeyed,
        ColorFormat::Alpha8,
    ] {
        assert_eq!(ColorFormat::from_code(cf.code()), Some(cf));
        assert!(cf.code() < 0x20);
    }
    assert_eq!(ColorFormat::from_code(7), None);
    assert!(ColorFormat::NativeAlpha.has_alpha());
    assert!(!ColorFormat::NativeChromaKeyed.has_alpha());
}

#[test]
fn header_byte_len() {
    let h = ImageHeader::new(3, 2, ColorFormat::Native);
    assert_eq!(h.row_bytes(), 12);
    assert_eq!(h.byte_len(), 24);
    assert_eq!(ImageHeader::new(3, 2, ColorFormat::Alpha8).byte_len(), 6);
}

#[test]
fn header_serializes_as_snake_case() {
    let h = ImageHeader::new(1, 2, ColorFormat::NativeAlpha);
    let json = serde_json::to_string(&h).unwrap();
    assert!(json.contains("\"native_alpha\""));
    let back: ImageHeader = serde_json::from_str(&json).unwrap();
    assert_eq!(back, h);
}
