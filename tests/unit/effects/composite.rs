use super::*;

fn solid_rgb(w: u32, h: u32, px: [u8; 3]) -> FrameRgb {
    FrameRgb::from_raw(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn transparent_source_leaves_destination() {
    let mut dst = solid_rgb(4, 4, [10, 20, 30]);
    let src = PremulImage::transparent(4, 4);
    over_premul_rgb(&mut dst, &src, 0, 0);
    assert_eq!(dst, solid_rgb(4, 4, [10, 20, 30]));
}

#[test]
fn opaque_source_replaces_destination() {
    let mut dst = solid_rgb(4, 4, [10, 20, 30]);
    let src = PremulImage::from_rgb(2, 2, &[200, 100, 0].repeat(4)).unwrap();
    over_premul_rgb(&mut dst, &src, 1, 1);
    assert_eq!(dst.pixel(0, 0), [10, 20, 30]);
    assert_eq!(dst.pixel(1, 1), [200, 100, 0]);
    assert_eq!(dst.pixel(2, 2), [200, 100, 0]);
    assert_eq!(dst.pixel(3, 3), [10, 20, 30]);
}

#[test]
fn half_alpha_blends() {
    let mut dst = solid_rgb(1, 1, [0, 0, 200]);
    // Straight (255, 0, 0, 128) premultiplied.
    let src = PremulImage::from_straight_rgba(1, 1, &[255, 0, 0, 128]).unwrap();
    over_premul_rgb(&mut dst, &src, 0, 0);
    let [r, g, b] = dst.pixel(0, 0);
    assert_eq!(r, 128);
    assert_eq!(g, 0);
    assert!((99..=100).contains(&b), "b={b}");
}

#[test]
fn offsets_clip_on_every_side() {
    let src = PremulImage::from_rgb(3, 3, &[255, 255, 255].repeat(9)).unwrap();

    let mut dst = solid_rgb(4, 4, [0, 0, 0]);
    over_premul_rgb(&mut dst, &src, -2, -2);
    assert_eq!(dst.pixel(0, 0), [255, 255, 255]);
    assert_eq!(dst.pixel(1, 0), [0, 0, 0]);

    let mut dst = solid_rgb(4, 4, [0, 0, 0]);
    over_premul_rgb(&mut dst, &src, 3, 3);
    assert_eq!(dst.pixel(3, 3), [255, 255, 255]);
    assert_eq!(dst.pixel(2, 3), [0, 0, 0]);

    let mut dst = solid_rgb(4, 4, [0, 0, 0]);
    over_premul_rgb(&mut dst, &src, 10, 0);
    assert_eq!(dst, solid_rgb(4, 4, [0, 0, 0]));
}
