//! Error types for the overlay core

/// Main error type for overlay operations
#[derive(Debug, thiserror::Error)]
pub enum SidequestError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SidequestError {
    /// User-facing message for errors surfaced by a poll cycle.
    ///
    /// Auth failures are user-correctable (re-enter the token); everything
    /// else collapses into the generic fetch-failure message and is retried
    /// naturally on the next scheduled poll.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(_) => "Authentication failed. Please check your TAPD token.",
            _ => "Failed to fetch TAPD data.",
        }
    }
}

// Implement From conversions for common error types

impl From<std::io::Error> for SidequestError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SidequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for SidequestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, SidequestError>;
