//! Error types for Vidtwin.

use thiserror::Error;

/// Library-level error type for Vidtwin operations.
#[derive(Error, Debug)]
pub enum VidtwinError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("Malformed record '{key}': {reason}")]
    RecordMalformed { key: String, reason: String },

    #[error("Model call failed: {0}")]
    ModelCall(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl VidtwinError {
    /// HTTP-equivalent status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            VidtwinError::Validation(_) => 400,
            VidtwinError::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Validation and model errors keep their detail; everything else is generic.
    pub fn user_message(&self) -> String {
        match self {
            VidtwinError::Validation(msg) => msg.clone(),
            VidtwinError::NotFound(what) => format!("{} not found", what),
            VidtwinError::ModelCall(cause) => format!("Model call failed: {}", cause),
            _ => "Failed to process request".to_string(),
        }
    }
}

/// Result type alias for Vidtwin operations.
pub type Result<T> = std::result::Result<T, VidtwinError>;
