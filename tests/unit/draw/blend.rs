use super::*;
use crate::foundation::core::{OPA_COVER, OPA_TRANSP};

#[test]
fn chroma_band_is_one_step_wide() {
    let range = ChromaKeyRange::for_draw(
        &DrawImageDsc::default(),
        ColorFormat::NativeChromaKeyed,
    )
    .unwrap();
    let key = Color32::CHROMA_KEY;
    assert!(range.contains(key));
    assert!(range.contains(Color32::rgb(1, 254, 1)));
    // Clamped at 255, so g=255 is the top of the band.
    assert!(range.contains(Color32::rgb(0, 255, 1)));
    assert!(!range.contains(Color32::rgb(2, 255, 0)));
    assert!(!range.contains(Color32::rgb(0, 253, 0)));
    assert!(range.contains(key.with_alpha(0)));
}

#[test]
fn recolored_key_tolerates_one_step_either_way() {
    let dsc = DrawImageDsc::new().with_recolor(Color32::rgb(200, 40, 100), 128);
    let range = ChromaKeyRange::for_draw(&dsc, ColorFormat::NativeChromaKeyed).unwrap();
    let key = Color32::mix(dsc.recolor, Color32::CHROMA_KEY, 128);
    assert_eq!(recolor(Color32::CHROMA_KEY, &dsc), key);

    for d in [-1i16, 1] {
        let shifted = Color32::rgb(
            (i16::from(key.r) + d) as u8,
            (i16::from(key.g) + d) as u8,
            (i16::from(key.b) + d) as u8,
        );
        assert!(range.contains(shifted), "{shifted:?} should be keyed");
    }
    for d in [-2i16, 2] {
        let shifted = Color32::rgb((i16::from(key.r) + d) as u8, key.g, key.b);
        assert!(!range.contains(shifted), "{shifted:?} should not be keyed");
    }
}

#[test]
fn no_key_range_without_chroma_format() {
    assert!(ChromaKeyRange::for_draw(&DrawImageDsc::default(), ColorFormat::Native).is_none());
    assert!(
        ChromaKeyRange::for_draw(&DrawImageDsc::default(), ColorFormat::NativeAlpha).is_none()
    );
}

#[test]
fn alpha_mode_selection() {
    assert_eq!(AlphaMode::select(OPA_COVER, ColorFormat::Native), AlphaMode::Override);
    assert_eq!(AlphaMode::select(100, ColorFormat::NativeChromaKeyed), AlphaMode::Override);
    assert_eq!(AlphaMode::select(OPA_MAX, ColorFormat::NativeAlpha), AlphaMode::Embedded);
    assert_eq!(AlphaMode::select(100, ColorFormat::NativeAlpha), AlphaMode::Multiply);
}

#[test]
fn blender_applies_alpha_modes() {
    let src = Color32::rgba(255, 0, 0, 128);
    let dst = Color32::rgb(0, 0, 255);

    let copy = PixelBlender::new(&DrawImageDsc::default(), ColorFormat::Native);
    assert!(copy.is_copy());
    assert_eq!(copy.blend(src, dst), Some(src));

    let embedded = PixelBlender::new(&DrawImageDsc::default(), ColorFormat::NativeAlpha);
    assert_eq!(embedded.blend(src, dst), Some(Color32::mix(src, dst, 128)));
    assert_eq!(embedded.blend(src.with_alpha(0), dst), None);

    let multiply = PixelBlender::new(&DrawImageDsc::new().with_opa(128), ColorFormat::NativeAlpha);
    assert_eq!(multiply.blend(src, dst), Some(Color32::mix(src, dst, 64)));

    let keyed = PixelBlender::new(&DrawImageDsc::default(), ColorFormat::NativeChromaKeyed);
    assert!(!keyed.is_copy());
    assert_eq!(keyed.blend(Color32::CHROMA_KEY, dst), None);
    assert_eq!(keyed.blend(src, dst), Some(src.with_alpha(255)));
}

#[test]
fn recolor_keeps_alpha() {
    let px = Color32::rgba(0, 0, 0, 77);
    assert_eq!(recolor(px, &DrawImageDsc::default()), px);
    let dsc = DrawImageDsc::new().with_recolor(Color32::WHITE, OPA_COVER);
    assert_eq!(recolor(px, &dsc), Color32::WHITE.with_alpha(77));
    let off = DrawImageDsc::new().with_recolor(Color32::WHITE, OPA_TRANSP);
    assert_eq!(recolor(px, &off), px);
}
