//! Common types and utilities shared across gabvid crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the workspace. It stays lightweight so that every crate
//! can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`GabvidError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use gabvid_common::GabvidError;
//!
//! let err = GabvidError::Config("no properties".into());
//! assert_eq!(err.to_string(), "Configuration error: no properties");
//! ```
use std::path::PathBuf;

pub mod observability;

/// Error types used across the gabvid workspace.
#[derive(thiserror::Error, Debug)]
pub enum GabvidError {
    /// The input document could not be opened or read.
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input document was read but is not valid UTF-8 text.
    #[error("Cannot decode {} as UTF-8", .path.display())]
    Decode { path: PathBuf },

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tracing subscriber or its file sink could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`GabvidError`].
pub type Result<T> = std::result::Result<T, GabvidError>;
