use super::*;

#[test]
fn zero_stride_is_rejected() {
    assert!(PixelBuf::new(&[], 0).is_err());
    assert!(PixelBufMut::new(&mut [], 0).is_err());
}

#[test]
fn out_of_bounds_access_is_clipped() {
    let mut px = vec![Color32::BLACK; 6];
    let mut buf = PixelBufMut::new(&mut px, 3).unwrap();
    assert_eq!(buf.height(), 2);
    buf.set(2, 1, Color32::WHITE);
    buf.set(3, 0, Color32::WHITE);
    buf.set(-1, 0, Color32::WHITE);
    buf.set(0, 2, Color32::WHITE);
    assert_eq!(buf.get(2, 1), Some(Color32::WHITE));
    assert_eq!(buf.get(3, 1), None);
    assert_eq!(px.iter().filter(|&&c| c == Color32::WHITE).count(), 1);
}

#[test]
fn rows_stop_at_the_stride() {
    let px: Vec<Color32> = (0..8).map(|i| Color32::rgb(i, 0, 0)).collect();
    let buf = PixelBuf::new(&px, 4).unwrap();
    let row = buf.row(2, 1, 10).unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row[0].r, 6);
    assert!(buf.row(0, 2, 1).is_none());
}

#[test]
fn fill_is_clipped_to_the_buffer() {
    let mut px = vec![Color32::BLACK; 9];
    let mut buf = PixelBufMut::new(&mut px, 3).unwrap();
    buf.fill(Area::new(-1, 1, 5, 7), Color32::WHITE);
    assert!(px[..3].iter().all(|&c| c == Color32::BLACK));
    assert!(px[3..].iter().all(|&c| c == Color32::WHITE));
}
