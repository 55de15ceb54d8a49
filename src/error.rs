//! Setup-time errors.
//!
//! Everything here is raised before the render path starts. Once audio is
//! running, out-of-range parameters are clamped instead of reported.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size must be between 1 and {max}, got {size}")]
    InvalidBlockSize { size: usize, max: usize },

    #[error("sequence must contain at least one step")]
    EmptySequence,

    #[error("step duration must be at least 1 ms")]
    InvalidStepDuration,

    #[error("delay line capacity must be at least 1 sample")]
    InvalidCapacity,

    #[error("{parameter} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("unknown note name {0:?}")]
    UnknownNote(String),

    #[error("gate mode needs a gate input")]
    MissingGateInput,
}

impl ConfigError {
    /// Check `value` against an inclusive range, naming the parameter on failure.
    pub(crate) fn check_range(
        parameter: &'static str,
        value: f32,
        min: f32,
        max: f32,
    ) -> Result<f32, ConfigError> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(ConfigError::OutOfRange {
                parameter,
                value,
                min,
                max,
            })
        }
    }
}
