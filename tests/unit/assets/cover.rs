use super::*;

#[test]
fn prepare_cover_is_exactly_square() {
    for (w, h) in [(400u32, 300u32), (120, 500), (64, 64), (1000, 1000)] {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            w,
            h,
            image::Rgb([90, 120, 30]),
        ));
        let out = prepare_cover(&img, 200).unwrap();
        assert_eq!(out.dimensions(), (200, 200), "source {w}x{h}");
    }
}

#[test]
fn prepare_cover_center_crops_the_long_axis() {
    // Left third red, middle third green, right third blue.
    let img = image::RgbImage::from_fn(300, 100, |x, _| match x / 100 {
        0 => image::Rgb([255, 0, 0]),
        1 => image::Rgb([0, 255, 0]),
        _ => image::Rgb([0, 0, 255]),
    });
    let out = prepare_cover(&image::DynamicImage::ImageRgb8(img), 100).unwrap();
    let center = out.get_pixel(50, 50).0;
    assert!(center[1] > 200 && center[0] < 40 && center[2] < 40, "{center:?}");
}

#[test]
fn prepare_cover_drops_alpha() {
    let img = image::RgbaImage::from_pixel(50, 50, image::Rgba([10, 200, 30, 0]));
    let out = prepare_cover(&image::DynamicImage::ImageRgba8(img), 50).unwrap();
    assert_eq!(out.dimensions(), (50, 50));
}

#[test]
fn placeholder_is_opaque_art_with_expected_colors() {
    let img = placeholder_cover(400).unwrap();
    assert_eq!(img.dimensions(), (400, 400));
    // Corner shows the background, the ring area the outer disc, the center the label.
    assert_eq!(img.get_pixel(2, 2).0, [40, 40, 60]);
    assert_eq!(img.get_pixel(200, 100).0, [60, 60, 80]);
    assert_eq!(img.get_pixel(200, 200).0, [40, 40, 60]);
}

#[test]
fn zero_size_is_rejected() {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
    assert!(prepare_cover(&img, 0).is_err());
    assert!(placeholder_cover(0).is_err());
}
