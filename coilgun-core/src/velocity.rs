//! Velocity estimation
//!
//! Velocity is measured in distance units per millisecond. Stage distances
//! come from configuration, so the unit cancels out: only the ratio between
//! a measured stage and the next one affects the predicted window.

use core::fmt;

/// Estimator failures
///
/// Both are recovered by the sequencer falling back to the next stage's
/// maximum duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VelocityError {
    /// Elapsed time was zero
    DivideByZero,
    /// Distance or velocity was non-positive, NaN or infinite, or the
    /// result was not finite
    InvalidInput,
}

impl fmt::Display for VelocityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocityError::DivideByZero => f.write_str("zero elapsed time"),
            VelocityError::InvalidInput => f.write_str("invalid distance or velocity"),
        }
    }
}

#[inline]
fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Velocity from a distance travelled in `elapsed_ms`
pub fn estimate(distance: f32, elapsed_ms: u32) -> Result<f32, VelocityError> {
    if !is_positive(distance) {
        return Err(VelocityError::InvalidInput);
    }
    if elapsed_ms == 0 {
        return Err(VelocityError::DivideByZero);
    }

    let velocity = distance / elapsed_ms as f32;
    // A tiny distance over a long time can underflow to zero
    if !is_positive(velocity) {
        return Err(VelocityError::InvalidInput);
    }
    Ok(velocity)
}

/// Time to cover `distance` at `velocity`, rounded to the nearest ms
///
/// Results beyond `u32::MAX` saturate; the caller clamps to the stage's
/// maximum duration anyway.
pub fn predict_time(distance: f32, velocity: f32) -> Result<u32, VelocityError> {
    if !is_positive(velocity) || !is_positive(distance) {
        return Err(VelocityError::InvalidInput);
    }

    let predicted = distance / velocity;
    if !predicted.is_finite() {
        return Err(VelocityError::InvalidInput);
    }

    // `as` saturates for out-of-range floats
    Ok((predicted + 0.5) as u32)
}
