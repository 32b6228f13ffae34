//! # Error Types
//!
//! This module defines error types used throughout the reelprint library.
//!
//! Only two kinds of failure ever reach a caller: rejected input and a
//! wholesale generation failure. Missing assets and unencodable barcodes are
//! degraded in place by the generators and never surface here.

use thiserror::Error;

/// Main error type for reelprint operations
#[derive(Debug, Error)]
pub enum ReelprintError {
    /// Malformed or empty scan code, or an impossible field value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Asset could not be fetched or decoded
    #[error("Asset error: {0}")]
    Asset(String),

    /// Document could not be produced; no partial output exists
    #[error("Document generation failed: {0}")]
    Generation(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level errors (binding the print service, HTTP client)
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON payload errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelprintError {
    /// Whether the caller is at fault (maps to a 4xx in the print service).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Json(_))
    }
}
