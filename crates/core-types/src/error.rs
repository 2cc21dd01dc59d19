use thiserror::Error;

/// Caller input that was rejected before any request was built.
///
/// Every variant names the offending field (or the timeframe rule that was
/// broken) so the caller can correct the arguments and try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field '{field}'")]
    Missing { field: String },

    #[error("invalid format for '{field}': expected {expected}")]
    InvalidFormat { field: String, expected: String },

    #[error("invalid value for '{field}': expected one of [{}]", allowed.join(", "))]
    InvalidEnum {
        field: String,
        allowed: Vec<&'static str>,
    },

    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("conflicting timeframe: supply either 'timeframe' or 'start_date'/'end_date', not both")]
    ConflictingTimeframe,

    #[error("missing timeframe: supply 'timeframe' or both 'start_date' and 'end_date'")]
    MissingTimeframe,

    #[error("incomplete range: '{missing}' is required when '{present}' is given")]
    IncompleteRange { present: String, missing: String },

    #[error("inverted range: start_date {start} is after end_date {end}")]
    InvertedRange { start: String, end: String },

    #[error("'{field}' is not month aligned: {reason}")]
    NotMonthAligned { field: String, reason: String },

    #[error("tool arguments must be a JSON object")]
    NotAnObject,
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        ValidationError::Missing {
            field: field.to_string(),
        }
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }
}
