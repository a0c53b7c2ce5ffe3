//! Error types for terracarve

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid grid dimensions {0}x{1}x{2}: every axis must be at least 1")]
    InvalidDimensions(i32, i32, i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
