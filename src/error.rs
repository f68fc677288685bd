use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComparerError>;

/// Every way a command invocation can fail.
///
/// Variants are grouped by where the failure happens so the binary (and
/// tests) can tell a missing key from a rejected request without string
/// matching.
#[derive(Debug, Error)]
pub enum ComparerError {
    #[error("{} environment variable not set", crate::config::API_KEY_ENV)]
    MissingApiKey,

    #[error("{} contains characters not allowed in an HTTP header", crate::config::API_KEY_ENV)]
    InvalidApiKey,

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("{0}")]
    Usage(String),

    #[error("API request failed")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response from server")]
    Decode(#[source] serde_json::Error),

    #[error("Error serializing JSON")]
    Serialize(#[source] serde_json::Error),

    #[error("Error reading input file {path}")]
    SpecRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}")]
    SpecParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error writing {path}: {message}")]
    Output { path: PathBuf, message: String },

    #[error("No models available to build a sample spec")]
    NoModels,
}

impl ComparerError {
    /// Build a server error from a non-success response body.
    ///
    /// JSON bodies carrying a `detail`, `error` or `message` string surface
    /// that string; anything else is passed through untouched.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["detail", "error", "message"]
                    .iter()
                    .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "(empty response body)".to_string()
                } else {
                    trimmed.to_string()
                }
            });

        ComparerError::Server { status, message }
    }
}
