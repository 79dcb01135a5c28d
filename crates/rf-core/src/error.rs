//! # AppError
//!
//! Centralized error handling for the Rusty-Feed ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., User, Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., weak password, malformed email)
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, malformed or expired session token, or bad credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not the owner and not an admin
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Like requested by an actor already in the liked set
    #[error("post already liked by this user")]
    AlreadyLiked,

    /// Unlike requested by an actor absent from the liked set
    #[error("no like to remove for this user")]
    NothingToRemove,

    /// Reaction flag outside {0, 1}
    #[error("invalid reaction flag {0}, expected 1 (like) or 0 (unlike)")]
    InvalidReaction(i64),

    /// Infrastructure failure (e.g., store down, blob storage unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Rusty-Feed logic.
pub type Result<T> = std::result::Result<T, AppError>;
