//! Eight bit pixel arithmetic that clamps to `0..=255` instead of wrapping.
//!
//! Multiplication rounds half away from zero before clamping, which is how an
//! 8-bit gray processor scales a value by a real factor. Addition and
//! subtraction are exact and only clamp.

pub fn saturating_multiply(factor: f32, value: u8) -> u8 {
    let product = (value as f64 * factor as f64).round();
    if product.is_nan() || product <= 0.0 {
        return 0;
    }
    product.min(u8::MAX as f64) as u8
}

pub fn saturating_add(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

pub fn saturating_subtract(a: u8, b: u8) -> u8 {
    a.saturating_sub(b)
}

pub fn multiply_array(values: &[u8], factor: f32) -> Vec<u8> {
    values
        .iter()
        .map(|&value| saturating_multiply(factor, value))
        .collect()
}

pub fn add_arrays(a: &[u8], b: &[u8]) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len(), "pixel arrays must have equal length");
    a.iter()
        .zip(b.iter())
        .map(|(&a, &b)| saturating_add(a, b))
        .collect()
}

pub fn subtract_arrays(a: &[u8], b: &[u8]) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len(), "pixel arrays must have equal length");
    a.iter()
        .zip(b.iter())
        .map(|(&a, &b)| saturating_subtract(a, b))
        .collect()
}

pub fn sum(values: &[u8]) -> u64 {
    values.iter().map(|&value| value as u64).sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn multiply_clamps_at_top() {
        assert_eq!(saturating_multiply(2.0, 200), 255);
        assert_eq!(saturating_multiply(2.0, 127), 254);
        assert_eq!(saturating_multiply(2.0, 128), 255);
    }

    #[test]
    fn multiply_rounds_to_nearest() {
        assert_eq!(saturating_multiply(0.5, 3), 2, "1.5 rounds up");
        assert_eq!(saturating_multiply(0.5, 2), 1);
        assert_eq!(saturating_multiply(1.5, 11), 17, "16.5 rounds up");
    }

    #[test]
    fn multiply_by_zero_or_negative_is_zero() {
        assert_eq!(saturating_multiply(0.0, 255), 0);
        assert_eq!(saturating_multiply(-3.0, 10), 0);
        assert_eq!(saturating_multiply(f32::NAN, 10), 0);
    }

    #[test]
    fn add_clamps_at_top() {
        assert_eq!(saturating_add(200, 100), 255);
        assert_eq!(saturating_add(200, 55), 255);
        assert_eq!(saturating_add(100, 54), 154);
    }

    #[test]
    fn subtract_clamps_at_bottom() {
        assert_eq!(saturating_subtract(50, 100), 0);
        assert_eq!(saturating_subtract(100, 50), 50);
    }

    #[test]
    fn multiply_uses_double_precision_product() {
        // 0.02_f32 is slightly below 0.02, so 75 * factor lies just under 1.5
        assert_eq!(saturating_multiply(0.02, 75), 1);
        assert_eq!(saturating_multiply(0.01, 150), 1);
        assert_eq!(saturating_multiply(0.02, 225), 4);
    }

    #[test]
    fn results_stay_in_byte_range_for_all_pairs() {
        for factor in [0.0_f32, 0.5, 1.0, 2.0, 7.25] {
            for a in 0..=255_u8 {
                let product = saturating_multiply(factor, a) as u32;
                let expected = ((a as f64 * factor as f64).round() as u32).min(255);
                assert_eq!(product, expected, "factor {} value {}", factor, a);
            }
        }
        for a in 0..=255_u8 {
            for b in 0..=255_u8 {
                assert_eq!(saturating_add(a, b) as u32, (a as u32 + b as u32).min(255));
                assert_eq!(
                    saturating_subtract(a, b) as i32,
                    (a as i32 - b as i32).max(0)
                );
            }
        }
    }

    #[test]
    fn array_operations_work_elementwise() {
        let red = [255, 100, 0];
        let green = [0, 100, 255];
        let blue = [0, 100, 255];
        let weighted_red = multiply_array(&red, 2.0);
        let green_blue = add_arrays(&green, &blue);
        let relative = subtract_arrays(&weighted_red, &multiply_array(&green_blue, 1.0));
        assert_eq!(weighted_red, vec![255, 200, 0]);
        assert_eq!(green_blue, vec![0, 200, 255]);
        assert_eq!(relative, vec![255, 0, 0]);
        assert_eq!(sum(&relative), 255);
    }
}
