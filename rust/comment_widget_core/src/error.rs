//! Error types for the widget core.

use thiserror::Error;

/// Shown when the comment list cannot be loaded, whatever the cause.
pub const LIST_LOAD_FAILED: &str = "Failed to load comments, please try again later";

/// Outcome of a failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network failure: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }

    /// Text suitable for a toast. Rejections carry the server's own message when it has one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Rejected { status, .. } => format!("Request failed with status {status}"),
            Self::Network(_) => "Network error, please check your connection".to_string(),
            Self::Malformed(_) => "Unexpected response from the server".to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Reasons a compose form cannot be submitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("comment content is empty")]
    EmptyContent,
    #[error("display name is required")]
    MissingDisplayName,
    #[error("email is required")]
    MissingEmail,
    #[error("sign in to comment")]
    LoginRequired,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid widget config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("page size must be positive")]
    ZeroPageSize,
    #[error("missing coordinate field `{0}`")]
    MissingCoordinate(&'static str),
}
