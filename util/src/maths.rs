//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp `value` into `[min, max]`.
///
/// Returns the clamped value and whether clamping was needed. A NaN value is
/// clamped to `min`.
pub fn clamp<T>(value: T, min: T, max: T) -> (T, bool)
where
    T: Float
{
    if value.is_nan() {
        (min, true)
    }
    else if value > max {
        (max, true)
    }
    else if value < min {
        (min, true)
    }
    else {
        (value, false)
    }
}

/// Number of whole cycles of length `period_s` needed to cover `duration_s`.
///
/// A non-positive duration takes no cycles.
pub fn cycles_in(duration_s: f64, period_s: f64) -> u64 {
    if duration_s <= 0.0 || period_s <= 0.0 {
        return 0;
    }

    // Remove float noise so that e.g. 2.0/0.02 doesn't become 101 cycles
    let cycles = duration_s / period_s;
    let rounded = cycles.round();
    if (cycles - rounded).abs() < 1e-9 {
        rounded as u64
    }
    else {
        cycles.ceil() as u64
    }
}
