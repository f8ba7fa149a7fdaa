//! Error types for GENEActiv .bin decoding

use thiserror::Error;

/// Error type for GENEActiv operations
#[derive(Error, Debug)]
pub enum GeneActivError {
    /// Underlying I/O failure while reading the input stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data page was reached before all calibration constants were captured
    #[error("data page reached before calibration was complete (missing: {0})")]
    MissingCalibration(String),

    /// A 3600-character data line contained non-hexadecimal content, or a
    /// page could not be stamped
    #[error("malformed data page: {0}")]
    MalformedPage(String),

    /// A "Page Time:" line matched but its timestamp failed to parse
    #[error("malformed page timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// A "Temperature:" line matched but its value failed to parse
    #[error("malformed temperature value: {0:?}")]
    MalformedTemperature(String),

    /// A header calibration line matched but its value failed to parse
    #[error("malformed header value for {key:?}: {value:?}")]
    MalformedHeader { key: &'static str, value: String },

    /// Aggregation input was not sorted ascending by timestamp
    #[error("sample table is not sorted ascending by timestamp")]
    UnsortedInput,

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for GENEActiv operations
pub type Result<T> = std::result::Result<T, GeneActivError>;
