//! Interpolation and clamping helpers.
//!
//! ```rust
//! use slice_math::{inverse_lerp, saturate};
//!
//! assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
//! assert_eq!(saturate(1.5), 1.0);
//! ```

use crate::GEOMETRY_EPSILON;

/// Inverse linear interpolation.
///
/// Returns 0.0 when `a == b`.
#[inline]
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    let range = b - a;
    if range.abs() < f64::EPSILON {
        0.0
    } else {
        (value - a) / range
    }
}

/// True when `a` and `b` agree to [`GEOMETRY_EPSILON`] relative to their magnitude.
///
/// Absolute below 1, so values near zero compare with the plain epsilon.
#[inline]
pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= GEOMETRY_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Clamps a value to `[min, max]`. NaN maps to `min`.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Clamps a value to `[0, 1]`.
#[inline]
pub fn saturate(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// Clamps a single-precision value to `[0, 1]`.
#[inline]
pub fn saturate_f32(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_lerp_degenerate() {
        assert_eq!(inverse_lerp(5.0, 5.0, 7.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 10.0, 2.5), 0.25);
    }

    #[test]
    fn test_nearly_equal_scales_with_magnitude() {
        assert!(nearly_equal(10.0, 10.0 + 1e-14));
        assert!(nearly_equal(1e6, 1e6 + 1e-4));
        assert!(!nearly_equal(1e6, 1e6 + 1.0));
        assert!(!nearly_equal(0.0, 1e-6));
    }

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(saturate(-3.0), 0.0);
        assert_eq!(saturate_f32(f32::NAN), 0.0);
    }
}
