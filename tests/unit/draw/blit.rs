use super::*;
use crate::foundation::core::Color32;

fn solid(n: usize, c: Color32) -> Vec<Color32> {
    vec![c; n]
}

fn gradient(w: i32, h: i32) -> Vec<Color32> {
    (0..h)
        .flat_map(|y| (0..w).map(move |x| Color32::rgb((x * 20) as u8, (y * 20) as u8, 7)))
        .collect()
}

/// Software engine that counts which primitive the compositor picked.
#[derive(Debug, Default)]
struct Counting {
    inner: SoftwareBlitter,
    covers: usize,
    composites: usize,
}

impl BlitEngine for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn supports(&self, dsc: &DrawImageDsc) -> bool {
        self.inner.supports(dsc)
    }

    fn cover(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
    ) -> Area {
        self.covers += 1;
        self.inner.cover(dest, dest_area, src, src_area, dsc)
    }

    fn composite(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
        cf: ColorFormat,
    ) {
        self.composites += 1;
        self.inner
            .composite(dest, dest_area, src, src_area, dsc, cf);
    }
}

fn counting() -> Compositor<Counting> {
    Compositor::new(
        Counting::default(),
        CompositorOpts::default().with_max_size(1, 1),
    )
}

#[test]
fn opaque_native_blit_is_a_byte_copy() {
    let src_px = gradient(10, 10);
    let src = PixelBuf::new(&src_px, 10).unwrap();
    let mut dest_px = solid(400, Color32::rgb(1, 2, 3));
    let mut dest = PixelBufMut::new(&mut dest_px, 20).unwrap();

    let mut comp = Compositor::software(CompositorOpts::default().with_max_size(1, 1));
    let dsc = DrawImageDsc::default();
    comp.blit(
        &mut dest,
        Area::from_size(4, 6, 10, 10),
        &src,
        Area::from_size(0, 0, 10, 10),
        &dsc,
        ColorFormat::Native,
    );

    for y in 0..10usize {
        let d = &dest_px[(y + 6) * 20 + 4..(y + 6) * 20 + 14];
        let s = &src_px[y * 10..y * 10 + 10];
        assert_eq!(
            bytemuck::cast_slice::<Color32, u8>(d),
            bytemuck::cast_slice::<Color32, u8>(s)
        );
    }
    assert_eq!(dest_px[0], Color32::rgb(1, 2, 3));
    assert_eq!(dest_px[6 * 20 + 14], Color32::rgb(1, 2, 3));
}

#[test]
fn decision_tree_picks_primitives() {
    let src_px = gradient(4, 4);
    let src = PixelBuf::new(&src_px, 4).unwrap();
    let area = Area::from_size(0, 0, 4, 4);
    let mut dest_px = solid(16, Color32::BLACK);

    // No recolor, no rotation: one composite pass.
    let mut comp = counting();
    let mut dest = PixelBufMut::new(&mut dest_px, 4).unwrap();
    comp.blit(&mut dest, area, &src, area, &DrawImageDsc::default(), ColorFormat::NativeAlpha);
    assert_eq!((comp.engine().covers, comp.engine().composites), (0, 1));

    // Rotation of an opaque source: a single direct cover, scratch untouched.
    let mut comp = counting();
    let dsc = DrawImageDsc::new().with_angle(1800).with_pivot(2, 2);
    comp.blit(&mut dest, area, &src, area, &dsc, ColorFormat::Native);
    assert_eq!((comp.engine().covers, comp.engine().composites), (1, 0));
    assert_eq!(comp.scratch().capacity(), 1);

    // Same rotation with an alpha source: cover into scratch, then composite.
    let mut comp = counting();
    comp.blit(&mut dest, area, &src, area, &dsc, ColorFormat::NativeAlpha);
    assert_eq!((comp.engine().covers, comp.engine().composites), (1, 1));
    assert_eq!(comp.scratch().capacity(), 16);

    // Recolor at partial opacity also needs two passes.
    let mut comp = counting();
    let dsc = DrawImageDsc::new()
        .with_recolor(Color32::WHITE, 100)
        .with_opa(128);
    comp.blit(&mut dest, area, &src, area, &dsc, ColorFormat::Native);
    assert_eq!((comp.engine().covers, comp.engine().composites), (1, 1));

    // Unsupported transforms bypass the engine.
    let mut comp = counting();
    let dsc = DrawImageDsc::new().with_angle(450).with_pivot(2, 2);
    comp.blit(&mut dest, area, &src, area, &dsc, ColorFormat::Native);
    assert_eq!((comp.engine().covers, comp.engine().composites), (0, 0));
}

#[test]
fn two_pass_rotation_blends_alpha() {
    // 2x1 source: opaque red then half-transparent blue.
    let src_px = vec![Color32::rgb(255, 0, 0), Color32::rgba(0, 0, 255, 128)];
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let mut dest_px = solid(9, Color32::BLACK);
    let mut dest = PixelBufMut::new(&mut dest_px, 3).unwrap();

    // offset = (0 + 0 - 1, 0 - 0) = (-1, 0): the rotated 1x2 column lands at x = 0.
    let dsc = DrawImageDsc::new().with_angle(900);
    let mut comp = Compositor::software(CompositorOpts::default().with_max_size(1, 1));
    comp.blit(
        &mut dest,
        Area::from_size(1, 0, 2, 1),
        &src,
        Area::from_size(0, 0, 2, 1),
        &dsc,
        ColorFormat::NativeAlpha,
    );

    assert_eq!(dest_px[0], Color32::rgb(255, 0, 0));
    assert_eq!(
        dest_px[3],
        Color32::mix(Color32::rgb(0, 0, 255), Color32::BLACK, 128)
    );
    assert!(dest_px[1..3].iter().all(|&c| c == Color32::BLACK));
    assert!(dest_px[4..].iter().all(|&c| c == Color32::BLACK));
}

#[test]
fn recolored_chroma_key_stays_transparent() {
    let key = Color32::CHROMA_KEY;
    let src_px = vec![key, Color32::rgb(10, 10, 10), key, key];
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let bg = Color32::rgb(9, 9, 9);
    let mut dest_px = solid(4, bg);
    let mut dest = PixelBufMut::new(&mut dest_px, 2).unwrap();

    let dsc = DrawImageDsc::new()
        .with_recolor(Color32::rgb(255, 0, 0), 128)
        .with_angle(1800)
        .with_pivot(1, 1);
    let area = Area::from_size(0, 0, 2, 2);
    let mut comp = Compositor::software(CompositorOpts::default().with_max_size(2, 2));
    comp.blit(&mut dest, area, &src, area, &dsc, ColorFormat::NativeChromaKeyed);

    // 180 degrees about the center: the one visible pixel moves from (1, 0) to (0, 1).
    let expected = Color32::mix(Color32::rgb(255, 0, 0), Color32::rgb(10, 10, 10), 128);
    assert_eq!(dest_px, vec![bg, bg, expected, bg]);
}

#[test]
fn nearly_transparent_draws_nothing() {
    let src_px = solid(4, Color32::WHITE);
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let mut dest_px = solid(4, Color32::BLACK);
    let mut dest = PixelBufMut::new(&mut dest_px, 2).unwrap();
    let area = Area::from_size(0, 0, 2, 2);
    let mut comp = Compositor::<SoftwareBlitter>::default();
    comp.blit(
        &mut dest,
        area,
        &src,
        area,
        &DrawImageDsc::new().with_opa(OPA_MIN - 1),
        ColorFormat::Native,
    );
    assert!(dest_px.iter().all(|&c| c == Color32::BLACK));
}

fn touched(px: &[Color32], bg: Color32) -> Vec<usize> {
    px.iter()
        .enumerate()
        .filter(|(_, c)| **c != bg)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn rotation_lands_in_same_place_at_any_opacity() {
    let src_px = solid(4, Color32::rgb(255, 0, 0));
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let dest_area = Area::from_size(0, 0, 4, 4);
    let src_area = Area::from_size(0, 0, 2, 2);
    let rotated = DrawImageDsc::new().with_angle(1800).with_pivot(2, 2);

    let mut spots = Vec::new();
    for opa in [255, 200] {
        let mut dest_px = solid(16, Color32::BLACK);
        let mut dest = PixelBufMut::new(&mut dest_px, 4).unwrap();
        let mut comp = Compositor::software(CompositorOpts::default().with_max_size(4, 4));
        let dsc = rotated.with_opa(opa);
        comp.blit(&mut dest, dest_area, &src, src_area, &dsc, ColorFormat::Native);
        spots.push(touched(&dest_px, Color32::BLACK));
    }

    // offset = (2 * 2 - 4, 2 * 2 - 4) = (0, 0) from the full 4x4 destination.
    assert_eq!(spots[0], vec![0, 1, 4, 5]);
    assert_eq!(spots[1], spots[0]);
}

#[test]
fn two_pass_ignores_previous_scratch_contents() {
    let dsc = DrawImageDsc::new().with_angle(1800).with_pivot(1, 1);
    let area = Area::from_size(0, 0, 2, 2);
    let mut comp = Compositor::software(CompositorOpts::default().with_max_size(4, 4));

    let white = solid(4, Color32::WHITE);
    let mut dest_px = solid(16, Color32::BLACK);
    let mut dest = PixelBufMut::new(&mut dest_px, 4).unwrap();
    comp.blit(
        &mut dest,
        area,
        &PixelBuf::new(&white, 2).unwrap(),
        area,
        &dsc,
        ColorFormat::NativeAlpha,
    );
    assert_eq!(touched(&dest_px, Color32::BLACK), vec![0, 1, 4, 5]);

    // One source row only: the rotated row that would come from row 1 has no pixels.
    let red = solid(2, Color32::rgb(255, 0, 0));
    let mut dest_px = solid(16, Color32::BLACK);
    let mut dest = PixelBufMut::new(&mut dest_px, 4).unwrap();
    comp.blit(
        &mut dest,
        area,
        &PixelBuf::new(&red, 2).unwrap(),
        area,
        &dsc,
        ColorFormat::NativeAlpha,
    );
    assert_eq!(touched(&dest_px, Color32::BLACK), vec![4, 5]);
    assert_eq!(dest_px[4], Color32::rgb(255, 0, 0));
}
