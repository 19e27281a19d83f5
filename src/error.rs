// src/error.rs
use thiserror::Error;

pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Failures raised by a profile search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API key is missing or still set to the placeholder value")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}
