//! Errors surfaced by the backend client.

use thiserror::Error;

/// Errors from talking to the App Manager backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// HTTP 200 carrying an `{error, status}` body.
    #[error("{message} (status {status})")]
    Application { status: u16, message: String },

    /// No response was received.
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Operator-facing notice for a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
}

impl ApiError {
    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map the failure to the notice shown to the operator.
    pub fn notice(&self) -> Option<Notice> {
        match self.status() {
            Some(401) => Some(Notice {
                title: "Session expired",
                description: "Please log in again to continue.",
            }),
            Some(403) => Some(Notice {
                title: "Access denied",
                description: "You don't have permission to perform this action.",
            }),
            Some(500 | 502 | 503) => Some(Notice {
                title: "Server error",
                description: "Something went wrong. Please try again later.",
            }),
            Some(_) => None,
            None => match self {
                Self::Transport(_) => Some(Notice {
                    title: "Network error",
                    description: "Please check your internet connection.",
                }),
                _ => None,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
