use crate::foundation::error::{VinylcastError, VinylcastResult};
use crate::foundation::math::mul_div255_u8;

/// Opaque packed RGB8 frame (background samples and final composites).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major `r,g,b` bytes, `width * height * 3` long.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// Allocate a black frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 3],
        }
    }

    /// Wrap existing RGB bytes, checking the buffer length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> VinylcastResult<Self> {
        if data.len() != width as usize * height as usize * 3 {
            return Err(VinylcastError::validation(format!(
                "rgb frame buffer size mismatch: got {} bytes for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Opaque RGBA8 copy, for PNG export.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 3 * 4);
        for px in self.data.chunks_exact(3) {
            out.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        out
    }
}

/// Premultiplied RGBA8 image (disc and text overlay bitmaps).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PremulImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied `r,g,b,a` bytes.
    pub data: Vec<u8>,
}

impl PremulImage {
    /// Allocate a fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_straight_rgba(width: u32, height: u32, rgba: &[u8]) -> VinylcastResult<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(VinylcastError::validation(format!(
                "rgba buffer size mismatch: got {} bytes for {width}x{height}",
                rgba.len()
            )));
        }
        let mut data = Vec::with_capacity(rgba.len());
        for px in rgba.chunks_exact(4) {
            let a = u16::from(px[3]);
            data.push(mul_div255_u8(u16::from(px[0]), a));
            data.push(mul_div255_u8(u16::from(px[1]), a));
            data.push(mul_div255_u8(u16::from(px[2]), a));
            data.push(px[3]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Opaque image from packed RGB bytes.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> VinylcastResult<Self> {
        if rgb.len() != width as usize * height as usize * 3 {
            return Err(VinylcastError::validation(format!(
                "rgb buffer size mismatch: got {} bytes for {width}x{height}",
                rgb.len()
            )));
        }
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplied RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Alpha at `(x, y)`.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/frame.rs"]
mod tests;
