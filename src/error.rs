use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline and filter operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration validation error: {0}")]
    ConfigValidationError(String),

    /// A mode string that is not one of the values the component accepts.
    #[error("Mode '{value}' not accepted for {kind}. Expected one of: {expected}")]
    UnknownMode {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization/Deserialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid regular expression: {source}")]
    RegexError {
        #[from]
        source: regex::Error,
    },

    #[error("HTTP request failed: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    /// A remote service answered, but not with something the filter understands.
    #[error("Invalid response received by '{filter}': {reason}")]
    InvalidResponse { filter: String, reason: String },

    /// Raised by the pipeline when one of its filters fails to execute.
    /// The in-progress check is aborted and no partial result is produced.
    #[error("Error in filter '{filter_name}': {source}")]
    FilterError {
        filter_name: String,
        source: Box<PipelineError>,
    },
}
