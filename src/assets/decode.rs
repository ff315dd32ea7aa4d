use std::path::Path;

use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Decode a still image from disk.
///
/// Missing, unreadable and undecodable files all surface as [`VinylcastError::ImageDecode`]
/// carrying the offending path.
pub fn decode_image(path: &Path) -> VinylcastResult<image::DynamicImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| VinylcastError::image_decode(path, e.to_string()))?
        .with_guessed_format()
        .map_err(|e| VinylcastError::image_decode(path, e.to_string()))?;
    reader
        .decode()
        .map_err(|e| VinylcastError::image_decode(path, e.to_string()))
}

/// Write straight-alpha RGBA8 as PNG.
pub fn write_png_rgba8(path: &Path, width: u32, height: u32, rgba: &[u8]) -> VinylcastResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| {
        VinylcastError::Other(anyhow::anyhow!(
            "failed to write png '{}': {e}",
            path.display()
        ))
    })
}
