use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Parse an in-memory SVG document.
pub fn parse_svg(svg: &str) -> VinylcastResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_str(svg, &opts)
        .map_err(|e| VinylcastError::validation(format!("invalid svg document: {e}")))
}

/// Rasterize `tree` scaled to exactly `width x height`, returning premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> VinylcastResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| VinylcastError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
