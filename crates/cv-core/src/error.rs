//! # AppError
//!
//! Centralized error handling for Commander's Vault.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all cv-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Sign-up or sign-in failure (bad credentials, duplicate email, weak password).
    /// The message is shown to the user as-is.
    #[error("{0}")]
    Auth(String),

    /// A failed read or write against the data store
    #[error("{0}")]
    Persistence(String),

    /// Business rule rejected the request before any write was attempted
    #[error("{0}")]
    Validation(String),

    /// Resource not found (e.g., Deck, Card)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a port failure as a persistence error, keeping only its message chain.
    pub fn persistence(err: anyhow::Error) -> Self {
        AppError::Persistence(format!("{err:#}"))
    }
}

/// A specialized Result type for Commander's Vault logic.
pub type Result<T> = std::result::Result<T, AppError>;
