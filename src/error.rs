//! Configuration errors
//!
//! The simulation itself never fails; these only surface when settings or
//! tuning are parsed or validated. Hosts log them and fall back to defaults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} = {value} is outside {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("speed range is inverted: min {min} > max {max}")]
    InvalidSpeedRange { min: f32, max: f32 },

    #[error("malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Check `value` against `ok`, reporting `name` and the human-readable `range` on failure
    pub(crate) fn check(
        name: &'static str,
        value: f64,
        range: &'static str,
        ok: bool,
    ) -> Result<(), ConfigError> {
        if ok && value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange { name, value, range })
        }
    }
}
