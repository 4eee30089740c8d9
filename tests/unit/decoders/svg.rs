use super::*;
use crate::decoder::registry::DecoderRegistry;
use crate::foundation::platform::StdFs;

const SQUARE: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
<rect x="0" y="0" width="20" height="10" fill="#ff0000"/>
</svg>"##;

fn decoder(max_dim: u32) -> SvgDecoder {
    SvgDecoder::new(Arc::new(StdFs::new()), max_dim)
}

#[test]
fn accepts_by_content_or_extension() {
    let dec = decoder(512);
    let caps = dec.accept(&ImageSource::buffer(SQUARE.to_vec())).unwrap();
    assert!(caps.contains(DecoderCaps::VECTOR | DecoderCaps::CACHED | DecoderCaps::TRANSPARENT));
    assert!(dec.accept(&ImageSource::file("icon.SVG").unwrap()).is_some());
    assert!(dec.accept(&ImageSource::buffer(b"\x89PNG".to_vec())).is_none());
    assert!(looks_like_svg(b"  <?xml version=\"1.0\"?>\n<svg>"));
}

#[test]
fn size_hint_controls_raster_size() {
    let mut reg = DecoderRegistry::new();
    reg.register(Box::new(decoder(512)));
    let src = ImageSource::buffer(SQUARE.to_vec());

    let mut dsc = DecodeDescriptor::new(src.clone());
    reg.open(&mut dsc, OpenFlags::Full).unwrap();
    assert_eq!(dsc.header, ImageHeader::new(20, 10, ColorFormat::NativeAlpha));
    let px = dsc.img_data.as_ref().unwrap().as_colors().unwrap();
    assert_eq!(px.len(), 200);
    assert_eq!(px[105], Color32::rgb(255, 0, 0));
    reg.close(&mut dsc);

    let mut dsc = DecodeDescriptor::new(src.clone()).with_size_hint(40, 0);
    reg.open(&mut dsc, OpenFlags::MetaOnly).unwrap();
    assert_eq!((dsc.header.w, dsc.header.h), (40, 20));

    let mut dsc = DecodeDescriptor::new(src).with_size_hint(0, 5);
    reg.open(&mut dsc, OpenFlags::MetaOnly).unwrap();
    assert_eq!((dsc.header.w, dsc.header.h), (10, 5));
}

#[test]
fn oversized_raster_fails_open() {
    let mut reg = DecoderRegistry::new();
    reg.register(Box::new(decoder(16)));
    let mut dsc = DecodeDescriptor::new(ImageSource::buffer(SQUARE.to_vec()));
    assert!(matches!(
        reg.open(&mut dsc, OpenFlags::Full),
        Err(ImgpipeError::OpenFailed { .. })
    ));
}
