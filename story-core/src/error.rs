//! Error types for story generation

use thiserror::Error;

/// Result type alias using the story Error type
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors while handling a story request
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Could not parse story: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("All providers failed and no fallback is available")]
    Exhausted,
}

impl Error {
    /// HTTP status code the handler answers with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) => 400,
            _ => 500,
        }
    }

    /// Short human-readable string for the JSON error body.
    ///
    /// Provider details never leak to the caller; they only reach the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Missing required parameters",
            Self::InvalidBody(_) => "Invalid JSON body",
            Self::ProviderNotConfigured(_) => "API key not configured",
            Self::Exhausted => "Failed to generate story",
            _ => "Internal server error",
        }
    }
}
