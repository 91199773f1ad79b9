use thiserror::Error;

/// Errors returned by GeoNames client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Operation name is not present in the registry.
    #[error("unknown operation '{0}'")]
    InvalidOperation(String),

    /// Operation is answered by the service with XML only and cannot be
    /// decoded by this crate.
    #[error("operation '{0}' is not implemented: the service answers it with XML only")]
    NotImplemented(&'static str),

    /// Expanded request URL is not a valid absolute URL.
    #[error("invalid request URL '{0}'")]
    InvalidUrl(String),

    /// HTTP transport-layer request failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be parsed as JSON.
    #[error("failed to parse JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Non-success HTTP status with a body that is not valid JSON.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response decoded successfully but carried the service error envelope.
    #[error("service error {value}: {message}")]
    Remote { value: i64, message: String },

    /// A `datetime` field could not be parsed with the configured format.
    #[error("failed to parse datetime '{value}': {source}")]
    Datetime {
        value: String,
        source: chrono::ParseError,
    },
}
