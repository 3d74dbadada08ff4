//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// The source range must not be zero-width.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Move `current` towards `target` by at most `max_step`.
///
/// If the target is within `max_step` of the current value the target is
/// returned exactly.
pub fn step_towards<T>(current: T, target: T, max_step: T) -> T
where
    T: Float,
{
    let delta = target - current;

    if delta.abs() > max_step {
        current + max_step * delta.signum()
    } else {
        target
    }
}

/// Clamp a value into `[min, max]`, returning the clamped value and whether
/// or not it had to be limited.
pub fn clamp_flagged<T>(value: T, min: T, max: T) -> (T, bool)
where
    T: Float,
{
    if value > max {
        (max, true)
    } else if value < min {
        (min, true)
    } else {
        (value, false)
    }
}
