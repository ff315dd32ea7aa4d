use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn interp_clamps_outside_control_points() {
    let xs = [0.0, 0.5, 1.0];
    let ys = [10.0, 20.0, 40.0];
    assert_eq!(interp(-1.0, &xs, &ys), 10.0);
    assert_eq!(interp(2.0, &xs, &ys), 40.0);
    assert!((interp(0.25, &xs, &ys) - 15.0).abs() < 1e-6);
    assert!((interp(0.75, &xs, &ys) - 30.0).abs() < 1e-6);
}

#[test]
fn interp_hits_control_values_exactly() {
    let xs = [0.0, 0.3, 0.6, 0.85, 1.0];
    let ys = [1.0, 2.0, 3.0, 4.0, 4.0];
    for (x, y) in xs.iter().zip(ys.iter()) {
        assert_eq!(interp(*x, &xs, &ys), *y);
    }
    assert_eq!(interp(0.9, &xs, &ys), 4.0);
}
