//! Remote store error types.

use thiserror::Error;

/// Result type for remote store operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur talking to the remote document store.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("authentication required")]
    NotAuthenticated,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal server error: {0}")]
    Internal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("network reported offline")]
    Offline,

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation failed after {attempts} attempt(s): {source}")]
    OperationFailed {
        attempts: u32,
        #[source]
        source: Box<CloudError>,
    },
}

impl CloudError {
    /// Returns true for transient failures worth another attempt.
    ///
    /// Authorization failures, malformed requests and local errors are
    /// terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Internal(_) => true,
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Classifies a non-success HTTP status from the document store.
    ///
    /// Returns `None` for success statuses.
    pub fn from_status(status: reqwest::StatusCode, detail: impl Into<String>) -> Option<Self> {
        use reqwest::StatusCode;

        if status.is_success() {
            return None;
        }
        let mut detail = detail.into();
        if detail.is_empty() {
            detail = status.to_string();
        }

        Some(match status {
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::FORBIDDEN => Self::PermissionDenied(detail),
            StatusCode::NOT_FOUND => Self::NotFound(detail),
            StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::BAD_GATEWAY
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::REQUEST_TIMEOUT => Self::Unavailable(detail),
            StatusCode::INTERNAL_SERVER_ERROR => Self::Internal(detail),
            _ => Self::InvalidRequest(detail),
        })
    }

    /// Maps a transport error. Connect and timeout failures mean the
    /// service is unavailable.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// The innermost error, looking through `OperationFailed`.
    pub fn root(&self) -> &CloudError {
        match self {
            Self::OperationFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
