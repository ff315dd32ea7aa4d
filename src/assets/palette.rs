use std::collections::HashMap;
use std::path::Path;

use image::imageops::FilterType;

/// Number of swatches the background consumes.
pub const DEFAULT_SWATCH_COUNT: usize = 4;

/// Fallback palette, used as-is when the cover cannot be decoded.
pub const DEFAULT_PALETTE: [[f32; 3]; 4] = [
    [30.0, 30.0, 60.0],
    [60.0, 40.0, 100.0],
    [40.0, 60.0, 120.0],
    [80.0, 50.0, 130.0],
];

const SAMPLE_SIZE: u32 = 150;
const BUCKET: u8 = 32;
const MIN_BRIGHTNESS: f32 = 30.0;
const MAX_BRIGHTNESS: f32 = 220.0;
const DARKEN: f32 = 0.6;

/// One representative colour, channels in `0..=255`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Swatch(pub [f32; 3]);

impl Swatch {
    pub fn to_rgb8(self) -> [u8; 3] {
        self.0.map(|c| c.clamp(0.0, 255.0) as u8)
    }

    fn scaled(self, factor: f32, lo: f32, hi: f32) -> Self {
        Self(self.0.map(|c| (c * factor).clamp(lo, hi)))
    }

    fn brightness(self) -> f32 {
        (self.0[0] + self.0[1] + self.0[2]) / 3.0
    }
}

/// Ordered swatches extracted from a cover; read-only once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    /// The fallback palette.
    pub fn default_palette() -> Self {
        Self {
            swatches: DEFAULT_PALETTE.iter().map(|&c| Swatch(c)).collect(),
        }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

/// Extract `count` dominant colours from a decoded image.
///
/// Buckets are ranked by frequency; equal counts keep row-major first-occurrence order.
pub fn extract_palette(img: &image::DynamicImage, count: usize) -> Palette {
    if count == 0 {
        return Palette {
            swatches: Vec::new(),
        };
    }

    let small = image::imageops::resize(
        &img.to_rgb8(),
        SAMPLE_SIZE,
        SAMPLE_SIZE,
        FilterType::CatmullRom,
    );

    let mut order = Vec::<([u8; 3], usize)>::new();
    let mut slot = HashMap::<[u8; 3], usize>::new();
    for px in small.pixels() {
        let q = px.0.map(|c| (c / BUCKET) * BUCKET);
        let i = *slot.entry(q).or_insert_with(|| {
            order.push((q, 0));
            order.len() - 1
        });
        order[i].1 += 1;
    }
    // Stable: ties stay in first-seen order.
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let mut swatches: Vec<Swatch> = order
        .iter()
        .take(count)
        .map(|(q, _)| Swatch(q.map(f32::from)))
        .filter(|s| {
            let b = s.brightness();
            MIN_BRIGHTNESS < b && b < MAX_BRIGHTNESS
        })
        .collect();

    if swatches.is_empty() {
        tracing::debug!("no usable cover colours, using default palette");
        swatches = Palette::default_palette().swatches;
    } else {
        let base = swatches[0];
        while swatches.len() < count {
            let factor = 0.7 + 0.1 * swatches.len() as f32;
            swatches.push(base.scaled(factor, 20.0, 200.0));
        }
    }
    while swatches.len() < count {
        let last = swatches[swatches.len() - 1];
        swatches.push(last);
    }
    swatches.truncate(count);

    Palette {
        swatches: swatches
            .into_iter()
            .map(|s| s.scaled(DARKEN, 20.0, 180.0))
            .collect(),
    }
}

/// Like [`extract_palette`], reading the image from disk. Never fails: an unreadable file
/// yields the default palette.
pub fn extract_palette_from_path(path: &Path, count: usize) -> Palette {
    match crate::assets::decode::decode_image(path) {
        Ok(img) => extract_palette(&img, count),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "palette extraction fell back to defaults");
            let mut p = Palette::default_palette();
            while p.swatches.len() < count {
                let last = p.swatches[p.swatches.len() - 1];
                p.swatches.push(last);
            }
            p.swatches.truncate(count);
            p
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/palette.rs"]
mod tests;
