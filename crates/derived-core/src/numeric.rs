//! Numeric helpers shared by derivation algorithms
//!
//! Bin edges computed through division and multiplication rarely land on the
//! exact same `f64` for values that are mathematically equal. Every edge used
//! as a lookup key goes through [`correct_float`] first.

use crate::error::{Error, Result};

/// Number of significant digits kept by [`correct_float`]
pub const FLOAT_PRECISION: i32 = 14;

/// Round `value` to [`FLOAT_PRECISION`] significant digits
///
/// Zero (including `-0.0`) normalizes to `0.0`. Non-finite values and values
/// too small to scale are returned unchanged.
pub fn correct_float(value: f64) -> f64 {
    correct_float_with(value, FLOAT_PRECISION)
}

/// Round `value` to `precision` significant digits
pub fn correct_float_with(value: f64, precision: i32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    if !value.is_finite() {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let exponent = precision - 1 - magnitude;

    let rounded = if exponent >= 0 {
        let scale = 10f64.powi(exponent);
        if !scale.is_finite() {
            return value;
        }
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-exponent);
        (value / scale).round() * scale
    };

    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Minimum and maximum of a sample, `None` when empty
pub fn min_max(samples: &[f64]) -> Option<(f64, f64)> {
    let first = *samples.first()?;
    Some(
        samples
            .iter()
            .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))),
    )
}

/// Reject samples containing NaN or infinite values
pub fn check_finite(samples: &[f64]) -> Result<()> {
    match samples.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(Error::NonFiniteSample {
            index,
            value: samples[index],
        }),
        None => Ok(()),
    }
}
