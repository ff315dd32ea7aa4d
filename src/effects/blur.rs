use crate::foundation::error::{VinylcastError, VinylcastResult};

/// Smoothing applied to background samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurMode {
    /// Separable Gaussian, sigma 0.8.
    #[default]
    Gaussian,
    /// 3x3 `[1 2 1]^T [1 2 1] / 16` kernel.
    Box3,
    /// Leave samples untouched.
    None,
}

/// Sigma of the background Gaussian.
pub const BACKGROUND_SIGMA: f32 = 0.8;

/// Kernel radius for `sigma`, matching a Gaussian truncated at 4 standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    (4.0 * sigma + 0.5).floor().max(0.0) as u32
}

/// Precomputed separable kernel for a [`BlurMode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlurKernel {
    weights_q16: Vec<u32>,
}

impl BlurKernel {
    pub fn for_mode(mode: BlurMode) -> VinylcastResult<Self> {
        let weights_q16 = match mode {
            BlurMode::Gaussian => {
                gaussian_kernel_q16(radius_for_sigma(BACKGROUND_SIGMA), BACKGROUND_SIGMA)?
            }
            // 1/4, 2/4, 1/4 per axis.
            BlurMode::Box3 => vec![16_384, 32_768, 16_384],
            BlurMode::None => vec![1 << 16],
        };
        Ok(Self { weights_q16 })
    }

    /// `true` when applying the kernel leaves the image unchanged.
    pub fn is_identity(&self) -> bool {
        self.weights_q16.len() == 1
    }

    pub fn radius(&self) -> usize {
        self.weights_q16.len() / 2
    }

    pub fn weights_q16(&self) -> &[u32] {
        &self.weights_q16
    }

    /// Blur packed RGB8 in place; `tmp` is resized as scratch.
    pub fn apply_rgb8(&self, data: &mut [u8], tmp: &mut Vec<u8>, width: u32, height: u32) {
        if self.is_identity() || width == 0 || height == 0 {
            return;
        }
        debug_assert_eq!(data.len(), width as usize * height as usize * 3);
        tmp.resize(data.len(), 0);
        horizontal_blur_q16::<3>(data, tmp, width, height, &self.weights_q16);
        vertical_blur_q16::<3>(tmp, data, width, height, &self.weights_q16);
    }
}

/// Normalized Gaussian weights in Q16 fixed point, summing to exactly `1 << 16`.
pub fn gaussian_kernel_q16(radius: u32, sigma: f32) -> VinylcastResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(VinylcastError::validation(
            "blur sigma must be finite and > 0",
        ));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push the rounding residue into the center tap.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_blur_q16<const C: usize>(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    k: &[u32],
) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = [0u64; C];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = (row + sx as usize) * C;
                for c in 0..C {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = (row + x as usize) * C;
            for c in 0..C {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16<const C: usize>(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    k: &[u32],
) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; C];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * C;
                for c in 0..C {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * C;
            for c in 0..C {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
