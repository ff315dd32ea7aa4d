pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Piecewise-linear interpolation of `x` over ascending control points `xs` with values `ys`.
///
/// Values left of `xs[0]` take `ys[0]`, values right of the last point take the last value.
/// Repeated control positions resolve to the rightmost segment.
pub(crate) fn interp(x: f32, xs: &[f32], ys: &[f32]) -> f32 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 {
        return 0.0;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // Last index with xs[i] <= x.
    let mut i = 0;
    while i + 1 < n && xs[i + 1] <= x {
        i += 1;
    }
    let (x0, x1) = (xs[i], xs[i + 1]);
    let (y0, y1) = (ys[i], ys[i + 1]);
    let span = x1 - x0;
    if span <= 0.0 {
        return y1;
    }
    y0 + (y1 - y0) * ((x - x0) / span)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
