//! Subtake Common - Shared types and traits
//!
//! This crate provides the data model, error type, and component traits
//! used across the subtake scanner workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{SubtakeError, SubtakeResult};
pub use traits::{Fetcher, RateLimiter, ResultSink, Scanner};
pub use types::{
    Evidence, Fingerprint, HttpResponse, ScanJob, ScanOptions, ScanResult, ScanStats, ScanStatus,
    DEFAULT_USER_AGENT, DEFAULT_WORKERS, MAX_RATE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
