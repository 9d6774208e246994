//! Error types for SkipKV
//!
//! Provides a unified error type for all fallible operations. Lookups that
//! miss are not errors: they surface as `None` / `false`.

use thiserror::Error;

/// Result type alias using SkipKvError
pub type Result<T> = std::result::Result<T, SkipKvError>;

/// Unified error type for SkipKV operations
#[derive(Debug, Error)]
pub enum SkipKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Skip list invariant violated: {0}")]
    InvariantViolation(String),
}
