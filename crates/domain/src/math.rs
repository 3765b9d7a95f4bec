//! Scalar helpers shared by target computation and color conversion.

/// Linear interpolation from `a` (at `t = 0`) to `b` (at `t = 1`).
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Restrict `value` to `[lo, hi]`.
#[must_use]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_endpoints_at_zero_and_one() {
        assert!((lerp(100.0, 1.0, 0.0) - 100.0).abs() < f64::EPSILON);
        assert!((lerp(100.0, 1.0, 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_interpolate_midpoint() {
        assert!((lerp(2200.0, 6500.0, 0.5) - 4350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_clamp_below_and_above() {
        assert!((clamp(-3.0, 0.0, 1.0)).abs() < f64::EPSILON);
        assert!((clamp(4.0, 0.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((clamp(0.25, 0.0, 1.0) - 0.25).abs() < f64::EPSILON);
    }
}
