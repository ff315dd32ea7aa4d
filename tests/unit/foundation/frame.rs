use super::*;

#[test]
fn rgb_frame_checks_buffer_length() {
    assert!(FrameRgb::from_raw(2, 2, vec![0; 11]).is_err());
    let f = FrameRgb::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(f.pixel(1, 0), [4, 5, 6]);
}

#[test]
fn rgba_export_is_opaque() {
    let f = FrameRgb::from_raw(2, 1, vec![10, 20, 30, 40, 50, 60]).unwrap();
    assert_eq!(f.to_rgba8(), vec![10, 20, 30, 255, 40, 50, 60, 255]);
}

#[test]
fn straight_alpha_is_premultiplied() {
    let img = PremulImage::from_straight_rgba(1, 1, &[200, 100, 0, 128]).unwrap();
    assert_eq!(img.pixel(0, 0), [100, 50, 0, 128]);
    assert!(PremulImage::from_straight_rgba(1, 1, &[0, 0, 0]).is_err());
}
