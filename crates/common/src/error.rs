//! Error types for the subtake scanner
//!
//! Engine failures never abort a scan: transport and pattern errors are folded
//! into per-subdomain results, while load errors stop the run before any
//! scheduling happens.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtakeError {
    /// Connection refused, DNS failure, TLS handshake failure, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("too many redirects: {0}")]
    RedirectLimit(String),

    #[error("invalid regex pattern {pattern}: {reason}")]
    PatternCompile { pattern: String, reason: String },

    #[error("failed to load fingerprints: {0}")]
    CatalogLoad(String),

    #[error("failed to load subdomains: {0}")]
    SubdomainListLoad(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SubtakeError {
    /// Whether a fetch attempt that failed with this error may be retried.
    #[inline]
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, SubtakeError::Transport(_))
    }
}

/// Result type alias for subtake operations
pub type SubtakeResult<T> = Result<T, SubtakeError>;
