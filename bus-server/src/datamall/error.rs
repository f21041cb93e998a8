//! DataMall client error types.

/// Which side of the exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request did not produce a successful HTTP response.
    Transport,
    /// The response body was not the JSON we expected.
    Parse,
}

/// Errors from the DataMall HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum DataMallError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid or missing AccountKey
    #[error("unauthorized: check DATAMALL_ACCOUNT_KEY")]
    Unauthorized,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },
}

impl DataMallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataMallError::Json { .. } => ErrorKind::Parse,
            _ => ErrorKind::Transport,
        }
    }

    /// Build a parse error keeping a short excerpt of the offending body.
    pub(crate) fn json(err: serde_json::Error, body: &str) -> Self {
        DataMallError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}
