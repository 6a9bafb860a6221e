// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley memory store.

use std::time::Duration;

use thiserror::Error;

/// Boxed error source carried by transport-level variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Parley traits and core operations.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// The backing store could not execute the operation (connection, I/O, busy).
    #[error("store unavailable: {source}")]
    StoreUnavailable { source: BoxError },

    /// A write was rejected because the turn is invalid (role outside the
    /// closed set, empty content, unknown agent).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A vector does not have the store's fixed dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The embedding provider failed or refused the request.
    #[error("embedding unavailable: {message}")]
    EmbeddingUnavailable {
        message: String,
        source: Option<BoxError>,
    },

    /// The text-generation provider could not be reached.
    #[error("provider unavailable: {message}")]
    ProviderUnavailable {
        message: String,
        source: Option<BoxError>,
    },

    /// The text-generation provider answered with a non-success status.
    #[error("provider error ({status}): {body}")]
    ProviderError { status: u16, body: String },

    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Prompt template could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// The caller's deadline elapsed before the operation finished.
    #[error("deadline exceeded after {after:?}")]
    DeadlineExceeded { after: Duration },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Shorthand for an `EmbeddingUnavailable` without an underlying source.
    pub fn embedding(message: impl Into<String>) -> Self {
        ParleyError::EmbeddingUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a `StoreUnavailable` built from a message.
    pub fn store(message: impl Into<String>) -> Self {
        ParleyError::StoreUnavailable {
            source: message.into().into(),
        }
    }

    /// Whether the memory layer may degrade instead of failing.
    ///
    /// Only embedding failures qualify. Dimension drift is a configuration
    /// bug and store failures must reach the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ParleyError::EmbeddingUnavailable { .. })
    }

    /// Whether the error came from the caller's scope rather than the operation.
    pub fn is_interruption(&self) -> bool {
        matches!(
            self,
            ParleyError::Cancelled | ParleyError::DeadlineExceeded { .. }
        )
    }
}
