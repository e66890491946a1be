//! Configuration errors.
//!
//! The per-tick update never fails; the only fallible operation in the crate
//! is validating tuning values before they reach the simulation.

use thiserror::Error;

/// A configuration value that the controller cannot run with sensibly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A rate, duration or distance was negative.
    #[error("`{field}` must not be negative (got {value})")]
    NegativeValue { field: &'static str, value: f32 },

    /// A value was NaN or infinite.
    #[error("`{field}` must be finite (got {value})")]
    NonFinite { field: &'static str, value: f32 },

    /// The max walkable slope angle is outside `[0, 90)` degrees.
    #[error("max slope angle must be within [0, 90) degrees (got {0})")]
    SlopeOutOfRange(f32),

    /// A blend factor or fraction is outside `[0, 1]`.
    #[error("`{field}` must be within [0, 1] (got {value})")]
    FractionOutOfRange { field: &'static str, value: f32 },

    /// The stamina pool has no capacity.
    #[error("stamina max must be greater than zero")]
    ZeroStamina,
}

/// Check that `value` is finite and not negative.
pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::NegativeValue { field, value });
    }
    Ok(())
}

/// Check that `value` is a finite fraction in `[0, 1]`.
pub(crate) fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field, value });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::FractionOutOfRange { field, value });
    }
    Ok(())
}
