//! Error taxonomy for analytics calls.
//!
//! Only two things can go wrong: the caller passed parameters that make no
//! sense, or the store failed. Zero denominators and empty inputs are not
//! errors; they show up as `None` metrics and empty result vectors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Rejected before any store read
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Propagated unchanged from the GraphStore
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AnalyticsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
