use super::*;
use crate::foundation::core::{Color32, OPA_COVER};

/// 3x2 source with distinct pixels: red channel encodes `x + 10 * y`.
fn numbered(w: i32, h: i32) -> Vec<Color32> {
    (0..h)
        .flat_map(|y| (0..w).map(move |x| Color32::rgb((x + 10 * y) as u8, 0, 0)))
        .collect()
}

#[test]
fn pivot_offsets_for_cardinal_angles() {
    let p = Point::new(5, 5);
    assert_eq!(pivot_offset(0, p, 10, 10), Point::new(0, 0));
    assert_eq!(pivot_offset(900, p, 10, 10), Point::new(0, 0));
    assert_eq!(pivot_offset(900, Point::new(2, 1), 4, 6), Point::new(-3, -1));
    assert_eq!(pivot_offset(1800, Point::new(2, 1), 4, 6), Point::new(0, -4));
    assert_eq!(pivot_offset(2700, Point::new(2, 1), 4, 6), Point::new(1, -1));
    assert_eq!(pivot_offset(450, Point::new(2, 1), 4, 6), Point::new(0, 0));
}

#[test]
fn rotation_maps_corners_clockwise() {
    // Top-left source pixel of a 3x2 image.
    assert_eq!(Rotation::Cw90.source_of(1, 0, 3, 2), (0, 0));
    assert_eq!(Rotation::Cw180.source_of(2, 1, 3, 2), (0, 0));
    assert_eq!(Rotation::Cw270.source_of(0, 2, 3, 2), (0, 0));
    assert_eq!(Rotation::Cw90.output_size(3, 2), (2, 3));
    assert_eq!(Rotation::from_angle(1234), None);
}

#[test]
fn cover_rotates_into_moved_area() {
    let src_px = numbered(3, 2);
    let src = PixelBuf::new(&src_px, 3).unwrap();
    let mut dest_px = vec![Color32::WHITE; 36];
    let mut dest = PixelBufMut::new(&mut dest_px, 6).unwrap();

    let dsc = DrawImageDsc::new().with_angle(900).with_pivot(1, 1);
    let out = cover_cardinal(
        &mut dest,
        Area::from_size(2, 2, 3, 2),
        &src,
        Area::from_size(0, 0, 3, 2),
        &dsc,
    );
    // offset = (1 + 1 - 2, 1 - 1) = (0, 0); output is 2 wide, 3 tall.
    assert_eq!(out, Area::from_size(2, 2, 2, 3));
    assert_eq!(dest.get(3, 2).map(|c| c.r), Some(0));
    assert_eq!(dest.get(2, 2).map(|c| c.r), Some(10));
    assert_eq!(dest.get(2, 4).map(|c| c.r), Some(12));
    assert_eq!(dest.get(4, 2), Some(Color32::WHITE));
}

#[test]
fn cover_recolors_at_full_strength() {
    let src_px = numbered(2, 2);
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let mut dest_px = vec![Color32::BLACK; 4];
    let mut dest = PixelBufMut::new(&mut dest_px, 2).unwrap();
    let dsc = DrawImageDsc::new().with_recolor(Color32::rgb(0, 0, 255), OPA_COVER);
    let area = Area::from_size(0, 0, 2, 2);
    cover_cardinal(&mut dest, area, &src, area, &dsc);
    assert!(dest_px.iter().all(|&c| c == Color32::rgb(0, 0, 255)));
}

#[test]
fn generic_zoom_doubles_pixels() {
    let src_px = numbered(2, 2);
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let mut dest_px = vec![Color32::WHITE; 16];
    let mut dest = PixelBufMut::new(&mut dest_px, 4).unwrap();
    let dsc = DrawImageDsc::new().with_zoom(512);
    transform_generic(
        &mut dest,
        Area::from_size(0, 0, 2, 2),
        &src,
        Area::from_size(0, 0, 2, 2),
        &dsc,
        ColorFormat::Native,
    );
    assert_eq!(dest.get(0, 0).map(|c| c.r), Some(0));
    assert_eq!(dest.get(1, 1).map(|c| c.r), Some(0));
    assert_eq!(dest.get(2, 0).map(|c| c.r), Some(1));
    assert_eq!(dest.get(3, 3).map(|c| c.r), Some(11));
}

#[test]
fn generic_half_turn_matches_cardinal_layout() {
    let src_px = numbered(2, 2);
    let src = PixelBuf::new(&src_px, 2).unwrap();
    let mut dest_px = vec![Color32::WHITE; 4];
    let mut dest = PixelBufMut::new(&mut dest_px, 2).unwrap();
    // Rotating about the image center keeps it in place.
    let dsc = DrawImageDsc::new().with_angle(1800).with_pivot(1, 1);
    let area = Area::from_size(0, 0, 2, 2);
    transform_generic(&mut dest, area, &src, area, &dsc, ColorFormat::Native);
    let reds: Vec<u8> = dest_px.iter().map(|c| c.r).collect();
    assert_eq!(reds, vec![11, 10, 1, 0]);
}
