//! The single rounding rule used by every merge and transform.
//!
//! Values are rounded to the nearest integer with ties going up
//! (`0.5 -> 1`, `1.5 -> 2`, `2.5 -> 3`). Inputs are never negative, so this
//! is the same as rounding half away from zero. The result is then clamped
//! into the representable range of the target field.

use crate::constants::{MAX_DURATION_TICKS, MAX_POTENCY};

/// Round a tick count and clamp it to `[0, MAX_DURATION_TICKS]`.
///
/// NaN maps to zero.
pub fn round_ticks(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let rounded = (value + 0.5).floor();
    if rounded >= f64::from(MAX_DURATION_TICKS) {
        MAX_DURATION_TICKS
    } else {
        rounded as u32
    }
}

/// Round a potency and clamp it to `[0, MAX_POTENCY]`.
pub fn round_potency(value: f64) -> u8 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let rounded = (value + 0.5).floor();
    if rounded >= f64::from(MAX_POTENCY) {
        MAX_POTENCY
    } else {
        rounded as u8
    }
}
