use image::imageops::FilterType;
use kurbo::{Affine, Point};

use crate::foundation::core::StageLayout;
use crate::foundation::error::{LayerName, VinylcastError, VinylcastResult};
use crate::foundation::frame::PremulImage;
use crate::foundation::math::mul_div255_u8;
use crate::layers::clip::Clip;

/// Standard LP speed.
pub const RPM: f64 = 33.333;
/// Transparent margin between the square edge and the disc.
pub const MASK_INSET: u32 = 5;

/// Angles are snapped to this many steps per degree so one full turn lands exactly on 0.
const ANGLE_STEPS_PER_DEGREE: f64 = 10_000.0;
const FULL_TURN_STEPS: u64 = 360 * 10_000;

/// Rotation angle in degrees at `t` seconds, in `[0, 360)`.
pub fn rotation_degrees(t: f64) -> f64 {
    let raw = (t * (RPM / 60.0) * 360.0).rem_euclid(360.0);
    let steps = (raw * ANGLE_STEPS_PER_DEGREE).round() as u64 % FULL_TURN_STEPS;
    steps as f64 / ANGLE_STEPS_PER_DEGREE
}

/// Seconds per revolution.
pub fn period_secs() -> f64 {
    60.0 / RPM
}

#[derive(Clone, Debug)]
enum DiscBitmap {
    /// Circle-masked cover, rotated per sample.
    Rotating(PremulImage),
    /// Unmasked, unrotated square crop used when masking fails.
    Static(PremulImage),
}

/// The spinning cover disc.
#[derive(Clone, Debug)]
pub struct DiscLayer {
    size: u32,
    duration: f64,
    bitmap: DiscBitmap,
}

impl DiscLayer {
    /// Bake the masked disc from a square cover, falling back to a static crop.
    pub fn new(cover: &image::RgbImage, size: u32, duration: f64) -> VinylcastResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VinylcastError::layer(
                LayerName::Disc,
                format!("duration must be > 0, got {duration}"),
            ));
        }
        let bitmap = choose_bitmap(bake_masked(cover, size), || static_square(cover, size))?;
        Ok(Self {
            size,
            duration,
            bitmap,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `true` when the layer degraded to the static square crop.
    pub fn is_static(&self) -> bool {
        matches!(self.bitmap, DiscBitmap::Static(_))
    }

    /// Top-left placement on the stage.
    pub fn position(layout: &StageLayout) -> (i32, i32) {
        layout.disc_origin
    }

    /// Render the sample at `t` into `out` (resized when needed).
    pub fn render_into(&self, t: f64, out: &mut PremulImage) -> VinylcastResult<()> {
        self.check_time(t)?;
        let src = match &self.bitmap {
            DiscBitmap::Static(img) => {
                out.clone_from(img);
                return Ok(());
            }
            DiscBitmap::Rotating(img) => img,
        };

        let degrees = rotation_degrees(t);
        if degrees == 0.0 {
            out.clone_from(src);
            return Ok(());
        }
        if out.width != src.width || out.height != src.height {
            *out = PremulImage::transparent(src.width, src.height);
        }
        rotate_premul_into(src, degrees, out);
        Ok(())
    }
}

impl Clip for DiscLayer {
    type Frame = PremulImage;

    fn duration(&self) -> f64 {
        self.duration
    }

    fn sample(&self, t: f64) -> VinylcastResult<PremulImage> {
        let mut out = PremulImage::transparent(self.size, self.size);
        self.render_into(t, &mut out)?;
        Ok(out)
    }
}

fn choose_bitmap(
    masked: VinylcastResult<PremulImage>,
    fallback: impl FnOnce() -> VinylcastResult<PremulImage>,
) -> VinylcastResult<DiscBitmap> {
    match masked {
        Ok(img) => Ok(DiscBitmap::Rotating(img)),
        Err(e) => {
            tracing::warn!(error = %e, "disc mask failed, using static square cover");
            fallback()
                .map(DiscBitmap::Static)
                .map_err(|e2| VinylcastError::layer(LayerName::Disc, e2.to_string()))
        }
    }
}

fn fit_square(cover: &image::RgbImage, size: u32) -> VinylcastResult<image::RgbImage> {
    if size == 0 {
        return Err(VinylcastError::validation("disc size must be non-zero"));
    }
    let (w, h) = cover.dimensions();
    if w == 0 || h == 0 {
        return Err(VinylcastError::validation("cover image is empty"));
    }
    if (w, h) == (size, size) {
        return Ok(cover.clone());
    }
    Ok(image::imageops::resize(
        cover,
        size,
        size,
        FilterType::CatmullRom,
    ))
}

/// Cover resized to `size`, multiplied by a circular mask inset [`MASK_INSET`] pixels with a
/// one-pixel anti-aliased rim, stored premultiplied.
fn bake_masked(cover: &image::RgbImage, size: u32) -> VinylcastResult<PremulImage> {
    if size <= 2 * MASK_INSET {
        return Err(VinylcastError::validation(format!(
            "disc size {size} leaves no room for the mask inset"
        )));
    }
    let fitted = fit_square(cover, size)?;
    let center = f64::from(size) / 2.0;
    let radius = f64::from(size - 2 * MASK_INSET) / 2.0;

    let mut out = PremulImage::transparent(size, size);
    for (x, y, px) in fitted.enumerate_pixels() {
        let dx = f64::from(x) + 0.5 - center;
        let dy = f64::from(y) + 0.5 - center;
        let cover_frac = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
        let a = (cover_frac * 255.0).round() as u8;
        if a == 0 {
            continue;
        }
        let i = (y as usize * size as usize + x as usize) * 4;
        let a16 = u16::from(a);
        out.data[i] = mul_div255_u8(u16::from(px.0[0]), a16);
        out.data[i + 1] = mul_div255_u8(u16::from(px.0[1]), a16);
        out.data[i + 2] = mul_div255_u8(u16::from(px.0[2]), a16);
        out.data[i + 3] = a;
    }
    Ok(out)
}

fn static_square(cover: &image::RgbImage, size: u32) -> VinylcastResult<PremulImage> {
    let (w, h) = cover.dimensions();
    let side = w.min(h);
    if side == 0 {
        return Err(VinylcastError::validation("cover image is empty"));
    }
    let crop =
        image::imageops::crop_imm(cover, (w - side) / 2, (h - side) / 2, side, side).to_image();
    let fitted = fit_square(&crop, size)?;
    PremulImage::from_rgb(size, size, fitted.as_raw())
}

/// Rotate `src` clockwise (on screen) by `degrees` about its center into `dst`, sampling
/// bilinearly; area mapped from outside `src` stays transparent.
fn rotate_premul_into(src: &PremulImage, degrees: f64, dst: &mut PremulImage) {
    let w = src.width as usize;
    let h = src.height as usize;
    let center = Point::new(src.width as f64 / 2.0, src.height as f64 / 2.0);
    // With y pointing down a positive kurbo rotation turns clockwise on screen.
    let inverse = Affine::rotate_about(degrees.to_radians(), center).inverse();
    let [a, b, c, d, e, f] = inverse.as_coeffs();

    for y in 0..h {
        let py = y as f64 + 0.5;
        for x in 0..w {
            let px = x as f64 + 0.5;
            // Source position in pixel-index space (pixel centers at integers).
            let sx = a * px + c * py + e - 0.5;
            let sy = b * px + d * py + f - 0.5;
            let out = bilinear_premul(src, sx, sy);
            let i = (y * w + x) * 4;
            dst.data[i..i + 4].copy_from_slice(&out);
        }
    }
}

fn bilinear_premul(src: &PremulImage, sx: f64, sy: f64) -> [u8; 4] {
    let w = src.width as i64;
    let h = src.height as i64;
    if sx <= -1.0 || sy <= -1.0 || sx >= w as f64 || sy >= h as f64 {
        return [0; 4];
    }
    let x0 = sx.floor() as i64;
    let y0 = sy.floor() as i64;
    let fx = sx - x0 as f64;
    let fy = sy - y0 as f64;

    let fetch = |x: i64, y: i64| -> [f64; 4] {
        if x < 0 || y < 0 || x >= w || y >= h {
            return [0.0; 4];
        }
        let i = ((y * w + x) as usize) * 4;
        let p = &src.data[i..i + 4];
        [
            f64::from(p[0]),
            f64::from(p[1]),
            f64::from(p[2]),
            f64::from(p[3]),
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for ch in 0..4 {
        let top = p00[ch] + (p10[ch] - p00[ch]) * fx;
        let bottom = p01[ch] + (p11[ch] - p01[ch]) * fx;
        out[ch] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    // Keep premultiplied invariant c <= a after rounding.
    for ch in 0..3 {
        out[ch] = out[ch].min(out[3]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layers/disc.rs"]
mod tests;
