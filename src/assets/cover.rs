use image::imageops::FilterType;

use crate::assets::svg_raster::{parse_svg, rasterize_svg_to_premul_rgba8};
use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Scale `img` to cover a `size x size` square, center-crop it, and sharpen lightly.
///
/// The result is the square cover consumed by palette extraction and the disc layer.
#[tracing::instrument(skip(img), fields(src_w = img.width(), src_h = img.height()))]
pub fn prepare_cover(img: &image::DynamicImage, size: u32) -> VinylcastResult<image::RgbImage> {
    if size == 0 {
        return Err(VinylcastError::validation("cover size must be non-zero"));
    }
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return Err(VinylcastError::validation("cover image is empty"));
    }

    let scale = f64::max(f64::from(size) / f64::from(w), f64::from(size) / f64::from(h));
    let new_w = ((f64::from(w) * scale) as u32).max(size);
    let new_h = ((f64::from(h) * scale) as u32).max(size);

    let resized = if (new_w, new_h) == (w, h) {
        rgb
    } else {
        image::imageops::resize(&rgb, new_w, new_h, FilterType::CatmullRom)
    };

    let left = (new_w - size) / 2;
    let top = (new_h - size) / 2;
    let cropped = image::imageops::crop_imm(&resized, left, top, size, size).to_image();

    // radius 1, threshold 3
    Ok(image::imageops::unsharpen(&cropped, 1.0, 3))
}

/// Synthesized vinyl-style artwork for jobs without a cover.
pub fn placeholder_cover(size: u32) -> VinylcastResult<image::RgbImage> {
    if size < 120 {
        return Err(VinylcastError::validation(
            "placeholder cover needs size >= 120",
        ));
    }
    let tree = parse_svg(&placeholder_svg(size))?;
    let premul = rasterize_svg_to_premul_rgba8(&tree, size, size)?;

    // The background rect covers every pixel, so the raster is opaque.
    let mut rgb = Vec::with_capacity(size as usize * size as usize * 3);
    for px in premul.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    image::RgbImage::from_raw(size, size, rgb)
        .ok_or_else(|| VinylcastError::validation("placeholder raster size mismatch"))
}

fn placeholder_svg(size: u32) -> String {
    let s = f64::from(size);
    let c = f64::from(size / 2);
    // Outlines sit inside the circle's bounding box, so the stroke center moves in by half
    // the stroke width.
    let outer_r = (s - 40.0) / 2.0 - 2.5;
    let inner_r = 50.0 - 1.5;
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
<rect x="0" y="0" width="{size}" height="{size}" fill="rgb(40,40,60)"/>
<circle cx="{c}" cy="{c}" r="{outer_r}" fill="rgb(60,60,80)" stroke="rgb(100,100,120)" stroke-width="5"/>
<circle cx="{c}" cy="{c}" r="{inner_r}" fill="rgb(40,40,60)" stroke="rgb(80,80,100)" stroke-width="3"/>
</svg>"#
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cover.rs"]
mod tests;
