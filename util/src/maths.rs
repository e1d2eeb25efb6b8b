//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Treat any value whose magnitude is below `threshold` as exactly zero.
///
/// Values at or above the threshold are passed through unchanged, there is no
/// rescaling of the remaining range.
pub fn apply_deadzone<T>(value: T, threshold: T) -> T
where
    T: Float
{
    if value.abs() < threshold {
        T::zero()
    }
    else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-1.5f64, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25f64, -1.0, 1.0), 0.25);
        assert_eq!(clamp(1.0f64, -1.0, 1.0), 1.0);
    }

    #[test]
    fn test_apply_deadzone() {
        assert_eq!(apply_deadzone(0.049f64, 0.05), 0.0);
        assert_eq!(apply_deadzone(-0.049f64, 0.05), 0.0);
        assert_eq!(apply_deadzone(0.05f64, 0.05), 0.05);
        assert_eq!(apply_deadzone(-0.05f64, 0.05), -0.05);
        assert_eq!(apply_deadzone(0.7f64, 0.05), 0.7);
        assert_eq!(apply_deadzone(0.0f64, 0.05), 0.0);
    }
}
