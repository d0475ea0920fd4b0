//! Error types for the rating service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Fight history unavailable at {path}: {message}")]
    StoreUnavailable { path: String, message: String },

    #[error("Malformed history record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Unknown result kind '{value}' on line {line}")]
    UnknownResultKind { line: u64, value: String },

    #[error("Failed to fetch event {event_id}: {reason}")]
    FetchFailure { event_id: String, reason: String },

    #[error("Invalid outcome at position {position}: {reason}")]
    InvalidOutcome { position: usize, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
