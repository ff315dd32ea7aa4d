use super::*;
use std::sync::Arc;

use crate::text::fonts::{FontResolver, REGULAR_WEIGHT, SystemFontResolver};

#[test]
fn builtin_face_measures_with_bitmap_metrics() {
    let mut shaper = TextShaper::new();
    let font = ResolvedFont::builtin(60.0);
    let m = shaper.measure(&font, "Test").unwrap();
    assert_eq!(
        m,
        LineMetrics {
            width: builtin::text_width("Test", 60.0),
            height: builtin::line_height(60.0),
        }
    );
    let mask = shaper.rasterize(&font, "Test").unwrap();
    assert_eq!((mask.width, mask.height), (m.width, m.height));
    assert_eq!((mask.origin_x, mask.origin_y), (0, 0));
    assert!(mask.data.iter().any(|&c| c == 255));
}

#[test]
fn invalid_sizes_are_rejected() {
    let mut shaper = TextShaper::new();
    assert!(shaper.measure(&ResolvedFont::builtin(0.0), "x").is_err());
    assert!(shaper.rasterize(&ResolvedFont::builtin(f32::NAN), "x").is_err());
}

#[test]
fn system_outline_face_renders_coverage() {
    let resolver = SystemFontResolver::new(None);
    let font = resolver.resolve("Helvetica", REGULAR_WEIGHT, 40.0);
    if font.is_builtin() {
        eprintln!("no system fonts; skipping");
        return;
    }
    let mut shaper = TextShaper::new();
    let short = shaper.measure(&font, "Hi").unwrap();
    let long = shaper.measure(&font, "Hi there, friends").unwrap();
    assert!(short.width > 0 && short.height > 0);
    assert!(long.width > short.width);

    let mask = shaper.rasterize(&font, "Hi").unwrap();
    assert!(mask.width >= short.width);
    assert!(mask.data.iter().any(|&c| c > 128));
}

#[test]
fn registered_face_shares_font_bytes() {
    let resolver = SystemFontResolver::new(None);
    let font = resolver.resolve("Helvetica", REGULAR_WEIGHT, 40.0);
    let FontFace::Outline(face) = &font.face else {
        eprintln!("no system fonts; skipping");
        return;
    };
    let mut shaper = TextShaper::new();
    shaper.measure(&font, "Hi").unwrap();
    // The font collection holds the same allocation instead of a copy.
    assert!(Arc::strong_count(&face.data) > 1);
}
