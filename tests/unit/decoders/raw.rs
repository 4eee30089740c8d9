use std::path::PathBuf;

use super::*;
use crate::decoder::descriptor::SessionState;
use crate::decoder::registry::DecoderRegistry;
use crate::foundation::platform::StdFs;
use crate::source::blob::encode_raw_blob;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "imgpipe_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn registry(fs: Arc<dyn SourceFs>) -> DecoderRegistry {
    let mut reg = DecoderRegistry::new();
    reg.register(Box::new(RawDecoder::new(fs)));
    reg
}

#[test]
fn native_buffer_aliases_source_bytes() {
    let pixels: Vec<u8> = (0..16).collect();
    let blob: Arc<[u8]> = encode_raw_blob(ImageHeader::new(2, 2, ColorFormat::Native), &pixels)
        .unwrap()
        .into();
    let reg = registry(Arc::new(StdFs::new()));

    let src = ImageSource::Buffer(Arc::clone(&blob));
    let (_, caps) = reg.find_accepting(&src).unwrap();
    assert_eq!(caps, DecoderCaps::CACHED);

    let mut dsc = DecodeDescriptor::new(src);
    reg.open(&mut dsc, OpenFlags::Full).unwrap();
    assert_eq!(dsc.state(), SessionState::Buffered);
    let img = dsc.img_data.as_ref().unwrap();
    assert!(img.shares(&blob));
    assert_eq!(img.as_bytes(), &pixels[..]);
    reg.close(&mut dsc);
}

#[test]
fn alpha8_buffer_is_tinted() {
    let blob = encode_raw_blob(ImageHeader::new(2, 1, ColorFormat::Alpha8), &[0, 200]).unwrap();
    let reg = registry(Arc::new(StdFs::new()));

    let src = ImageSource::buffer(blob);
    assert_eq!(
        reg.get_info(&src).unwrap(),
        ImageHeader::new(2, 1, ColorFormat::NativeAlpha)
    );

    let mut dsc = DecodeDescriptor::new(src).with_color(Color32::rgb(10, 20, 30));
    reg.open(&mut dsc, OpenFlags::Full).unwrap();
    let px = dsc.img_data.as_ref().unwrap().as_colors().unwrap();
    assert_eq!(px, &[Color32::rgba(10, 20, 30, 0), Color32::rgba(10, 20, 30, 200)]);
    reg.close(&mut dsc);
}

#[test]
fn truncated_buffer_is_declined() {
    let mut blob =
        encode_raw_blob(ImageHeader::new(2, 2, ColorFormat::Native), &[0u8; 16]).unwrap();
    blob.truncate(10);
    let reg = registry(Arc::new(StdFs::new()));
    assert!(reg.find_accepting(&ImageSource::buffer(blob)).is_none());
}

#[test]
fn bin_file_streams_rows() {
    let tmp = temp_dir("raw_bin");
    std::fs::create_dir_all(&tmp).unwrap();
    let blob = encode_raw_blob(
        ImageHeader::new(3, 2, ColorFormat::Alpha8),
        &[1, 2, 3, 4, 5, 6],
    )
    .unwrap();
    std::fs::write(tmp.join("glyph.bin"), &blob).unwrap();

    let reg = registry(Arc::new(StdFs::with_root(&tmp)));
    let src = ImageSource::file("glyph.bin").unwrap();
    let (_, caps) = reg.find_accepting(&src).unwrap();
    assert!(!caps.contains(DecoderCaps::CACHED));
    assert!(caps.contains(DecoderCaps::TRANSPARENT));

    let mut dsc = DecodeDescriptor::new(src).with_color(Color32::WHITE);
    reg.open(&mut dsc, OpenFlags::Full).unwrap();
    assert_eq!(dsc.state(), SessionState::Streaming);
    assert_eq!(dsc.header, ImageHeader::new(3, 2, ColorFormat::NativeAlpha));

    let mut line = [0u8; 8];
    reg.read_line(&mut dsc, 1, 1, 2, &mut line).unwrap();
    let px: &[Color32] = bytemuck::cast_slice(&line);
    assert_eq!(px, &[Color32::WHITE.with_alpha(5), Color32::WHITE.with_alpha(6)]);

    reg.close(&mut dsc);
    assert!(dsc.ctx.is_none());
    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn non_bin_files_are_declined() {
    let reg = registry(Arc::new(StdFs::new()));
    assert!(reg.find_accepting(&ImageSource::file("a.png").unwrap()).is_none());
    assert!(reg.find_accepting(&ImageSource::symbol("a").unwrap()).is_none());
}
