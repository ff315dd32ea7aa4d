use super::*;

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> image::DynamicImage {
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(w, h, image::Rgb(rgb)))
}

fn assert_close(a: [f32; 3], b: [f32; 3]) {
    for c in 0..3 {
        assert!((a[c] - b[c]).abs() < 1e-3, "{a:?} != {b:?}");
    }
}

#[test]
fn single_colour_pads_with_scaled_variations() {
    let p = extract_palette(&solid(64, 64, [100, 150, 200]), 4);
    assert_eq!(p.len(), 4);
    // Bucket (96, 128, 192) then factors 0.8, 0.9, 1.0, all darkened by 0.6.
    assert_close(p.swatches()[0].0, [57.6, 76.8, 115.2]);
    assert_close(p.swatches()[1].0, [46.08, 61.44, 92.16]);
    assert_close(p.swatches()[2].0, [51.84, 69.12, 103.68]);
    assert_close(p.swatches()[3].0, [57.6, 76.8, 115.2]);
}

#[test]
fn too_bright_cover_uses_darkened_defaults() {
    let p = extract_palette(&solid(32, 32, [255, 255, 255]), 4);
    assert_close(p.swatches()[0].0, [20.0, 20.0, 36.0]);
    assert_close(p.swatches()[3].0, [48.0, 30.0, 78.0]);
}

#[test]
fn every_channel_is_clamped_and_count_is_exact() {
    let img = image::RgbImage::from_fn(97, 53, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 3 % 256) as u8])
    });
    let img = image::DynamicImage::ImageRgb8(img);
    for count in [1usize, 4, 7] {
        let p = extract_palette(&img, count);
        assert_eq!(p.len(), count);
        for s in p.swatches() {
            for c in s.0 {
                assert!((20.0..=180.0).contains(&c), "channel {c} out of range");
            }
        }
    }
}

#[test]
fn extraction_is_deterministic() {
    let img = image::RgbImage::from_fn(80, 80, |x, y| {
        image::Rgb([(x * 3) as u8, (y * 2) as u8, 90])
    });
    let img = image::DynamicImage::ImageRgb8(img);
    assert_eq!(extract_palette(&img, 4), extract_palette(&img, 4));
}

#[test]
fn dominant_bucket_comes_first() {
    // Three quarters blue-ish, one quarter orange-ish.
    let img = image::RgbImage::from_fn(200, 200, |x, _| {
        if x < 150 {
            image::Rgb([40, 70, 160])
        } else {
            image::Rgb([200, 120, 40])
        }
    });
    let p = extract_palette(&image::DynamicImage::ImageRgb8(img), 4);
    // (32, 64, 160) * 0.6
    assert_close(p.swatches()[0].0, [20.0, 38.4, 96.0]);
}

#[test]
fn undecodable_file_yields_default_palette() {
    let path = std::env::temp_dir().join(format!(
        "vinylcast_palette_bad_{}_{}.png",
        std::process::id(),
        line!()
    ));
    std::fs::write(&path, b"definitely not a png").unwrap();
    let p = extract_palette_from_path(&path, 4);
    let _ = std::fs::remove_file(&path);
    assert_eq!(p, Palette::default_palette());

    let missing = extract_palette_from_path(Path::new("/nonexistent/cover.jpg"), 4);
    assert_eq!(missing, Palette::default_palette());
}
