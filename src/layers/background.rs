use std::sync::Arc;

use crate::assets::palette::Palette;
use crate::effects::blur::{BlurKernel, BlurMode};
use crate::foundation::core::Canvas;
use crate::foundation::error::{LayerName, VinylcastError, VinylcastResult};
use crate::foundation::frame::FrameRgb;
use crate::foundation::math::interp;
use crate::layers::clip::Clip;

/// Angular drift of the whole pattern, radians per second.
const ANGULAR_SPEED: f64 = 0.3;
const CONTROL_POINTS: [f32; 5] = [0.0, 0.3, 0.6, 0.85, 1.0];

/// Per-pixel terms that do not depend on time.
#[derive(Debug)]
struct PolarField {
    /// `2 * angle + 0.008 * dist`
    phase1: Vec<f32>,
    /// `3.5 * angle + 0.012 * dist`
    phase2: Vec<f32>,
    /// `clamp(dist / max_dist, 0, 1)`
    dist_factor: Vec<f32>,
}

impl PolarField {
    fn new(canvas: Canvas) -> Self {
        let n = canvas.pixel_count();
        let mut phase1 = Vec::with_capacity(n);
        let mut phase2 = Vec::with_capacity(n);
        let mut dist_factor = Vec::with_capacity(n);

        let cx = i64::from(canvas.width / 2);
        let cy = i64::from(canvas.height / 2);
        let max_dist = ((cx * cx + cy * cy) as f64).sqrt().max(f64::MIN_POSITIVE);
        for y in 0..i64::from(canvas.height) {
            let dy = (y - cy) as f64;
            for x in 0..i64::from(canvas.width) {
                let dx = (x - cx) as f64;
                let dist = (dx * dx + dy * dy).sqrt();
                let angle = dy.atan2(dx);
                phase1.push((2.0 * angle + 0.008 * dist) as f32);
                phase2.push((3.5 * angle + 0.012 * dist) as f32);
                dist_factor.push((dist / max_dist).clamp(0.0, 1.0) as f32);
            }
        }

        Self {
            phase1,
            phase2,
            dist_factor,
        }
    }
}

/// Animated radial gradient driven by four palette swatches.
#[derive(Clone, Debug)]
pub struct Background {
    canvas: Canvas,
    duration: f64,
    field: Arc<PolarField>,
    /// Per-channel values at [`CONTROL_POINTS`]: c1, c2, c3, c4, c4.
    channels: [[f32; 5]; 3],
    kernel: BlurKernel,
}

impl Background {
    /// Build the layer; the palette must hold at least four swatches.
    pub fn new(
        canvas: Canvas,
        palette: &Palette,
        duration: f64,
        blur: BlurMode,
    ) -> VinylcastResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(VinylcastError::layer(
                LayerName::Background,
                "canvas must be non-empty",
            ));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VinylcastError::layer(
                LayerName::Background,
                format!("duration must be > 0, got {duration}"),
            ));
        }
        let sw = palette.swatches();
        if sw.len() < 4 {
            return Err(VinylcastError::layer(
                LayerName::Background,
                format!("palette needs 4 swatches, got {}", sw.len()),
            ));
        }
        let mut channels = [[0.0f32; 5]; 3];
        for (c, ch) in channels.iter_mut().enumerate() {
            *ch = [sw[0].0[c], sw[1].0[c], sw[2].0[c], sw[3].0[c], sw[3].0[c]];
        }
        let kernel = BlurKernel::for_mode(blur)
            .map_err(|e| VinylcastError::layer(LayerName::Background, e.to_string()))?;

        Ok(Self {
            canvas,
            duration,
            field: Arc::new(PolarField::new(canvas)),
            channels,
            kernel,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Render the sample at `t` into `out`, reusing `scratch` for the blur.
    pub fn render_into(
        &self,
        t: f64,
        out: &mut FrameRgb,
        scratch: &mut Vec<u8>,
    ) -> VinylcastResult<()> {
        self.check_time(t)?;
        if out.width != self.canvas.width || out.height != self.canvas.height {
            *out = FrameRgb::new(self.canvas.width, self.canvas.height);
        }

        let tau = t * ANGULAR_SPEED;
        // wave1 = sin(2(a + tau) + 0.008d + 1.5tau), wave2 = sin(3.5(a + tau) + 0.012d + 2.2tau)
        let shift1 = 3.5 * tau;
        let shift2 = 5.7 * tau;
        let drift = (0.05 * tau) as f32;

        let f = &*self.field;
        for (i, px) in out.data.chunks_exact_mut(3).enumerate() {
            let w1 = (f64::from(f.phase1[i]) + shift1).sin() * 0.5 + 0.5;
            let w2 = (f64::from(f.phase2[i]) + shift2).sin() * 0.5 + 0.5;
            let wave = ((w1 + w2) * 0.5) as f32;

            let radial = (f.dist_factor[i] + wave * 0.4 + drift).clamp(0.0, 1.0);
            let brightness = 0.75 + wave * 0.25;
            for c in 0..3 {
                let v = interp(radial, &CONTROL_POINTS, &self.channels[c]) * brightness;
                px[c] = v.clamp(0.0, 255.0) as u8;
            }
        }

        self.kernel
            .apply_rgb8(&mut out.data, scratch, out.width, out.height);
        Ok(())
    }
}

impl Clip for Background {
    type Frame = FrameRgb;

    fn duration(&self) -> f64 {
        self.duration
    }

    fn sample(&self, t: f64) -> VinylcastResult<FrameRgb> {
        let mut out = FrameRgb::new(self.canvas.width, self.canvas.height);
        self.render_into(t, &mut out, &mut Vec::new())?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/background.rs"]
mod tests;
