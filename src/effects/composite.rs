use crate::foundation::frame::{FrameRgb, PremulImage};
use crate::foundation::math::mul_div255_u16;

/// Composite a premultiplied RGBA image over an opaque RGB frame with its top-left corner at
/// `(x, y)`. Pixels falling outside `dst` are clipped.
///
/// Per channel: `dst = src + dst * (1 - src_a)`.
pub fn over_premul_rgb(dst: &mut FrameRgb, src: &PremulImage, x: i32, y: i32) {
    let dst_w = dst.width as i64;
    let dst_h = dst.height as i64;
    let (x, y) = (i64::from(x), i64::from(y));

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(src.width)).min(dst_w);
    let y1 = (y + i64::from(src.height)).min(dst_h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let src_w = src.width as usize;
    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let sx0 = (x0 - x) as usize;
        let span = (x1 - x0) as usize;
        let s_row = &src.data[(sy * src_w + sx0) * 4..(sy * src_w + sx0 + span) * 4];
        let d_start = (dy as usize * dst.width as usize + x0 as usize) * 3;
        let d_row = &mut dst.data[d_start..d_start + span * 3];
        blend_row(d_row, s_row);
    }
}

fn blend_row(dst_rgb: &mut [u8], src_premul: &[u8]) {
    for (d, s) in dst_rgb.chunks_exact_mut(3).zip(src_premul.chunks_exact(4)) {
        let a = s[3];
        if a == 0 {
            continue;
        }
        if a == 255 {
            d.copy_from_slice(&s[..3]);
            continue;
        }
        let inv = 255u16 - u16::from(a);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(d[c]), inv);
            d[c] = v.min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
