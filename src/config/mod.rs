//! Configuration module
//!
//! Settings file handling plus the environment lookups the client needs
//! before it can talk to the service.

pub mod config;

pub use config::{Config, TableStyle};

/// Environment variable holding the service API key.
pub const API_KEY_ENV: &str = "COMPARER_API_KEY";

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://agentcomparer.com";

/// Read the API key from the environment. Blank values count as unset.
pub fn api_key_from_env() -> crate::error::Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(crate::error::ComparerError::MissingApiKey),
    }
}
