use thiserror::Error;

/// Errors produced inside the gateway core. Every variant carries a
/// human-readable message because faults are ultimately rendered into the
/// `report` field of an error-shaped response rather than propagated upward.
#[derive(Error, Debug)]
pub enum TutorGatewayError {
    #[error("Generative API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TutorGatewayError>;
