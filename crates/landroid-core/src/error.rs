//! User input validation errors
//!
//! These are raised synchronously from service calls and abort the single
//! operation before anything is sent to the device.

use thiserror::Error;

/// Result type for input parsing and encoding
pub type InputResult<T> = Result<T, InputError>;

/// Errors caused by invalid service call data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A schedule day has a start time but no end time
    #[error("No end time specified for {day}")]
    MissingEndTime { day: String },

    /// A schedule time could not be parsed
    #[error("invalid time '{value}' for {field}, expected HH:MM or HH:MM:SS")]
    InvalidTime { field: String, value: String },

    /// A schedule day ends before it starts
    #[error("end time {end} is before start time {start} for {day}")]
    EndBeforeStart {
        day: String,
        start: String,
        end: String,
    },

    /// Unknown schedule type
    #[error("unknown schedule type '{0}', expected 'primary' or 'secondary'")]
    UnknownScheduleKind(String),

    /// Zone distance array has the wrong shape
    #[error("Incorrect format for multizone distances array")]
    ZoneDistancesFormat,

    /// Zone probability array has the wrong shape
    #[error("Incorrect format for multizone probabilities array")]
    ZoneProbabilitiesFormat,

    /// Zone probabilities must add up to 100 or 0
    #[error("Sum of zone probabilities array MUST be 100 or 0 (disabled), request was: {sum}")]
    ZoneProbabilitiesSum { sum: i64 },

    /// A required field is absent from the call data
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong type or range
    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl InputError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
