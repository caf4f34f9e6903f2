//! Core traits for subtake scanner components
//!
//! The orchestrator only sees [`Scanner`]; the HTTP prober only sees
//! [`Fetcher`]. Both seams let tests swap in deterministic fakes.

use crate::types::{HttpResponse, ScanResult};
use async_trait::async_trait;

/// Probes one subdomain and classifies it. Never fails: problems are
/// reported as a result with `status == Error`.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, subdomain: &str) -> ScanResult;

    /// Scanner name/identifier
    fn name(&self) -> &str;
}

/// Performs one logical fetch (including retries) of a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> HttpResponse;
}

/// Paces operations in rate-limited mode.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until next operation is allowed
    async fn acquire(&self);

    /// Operations per second
    fn current_rate(&self) -> f64;
}

/// Receives each result the moment it is finalized, before the ordered
/// result list is complete.
pub trait ResultSink: Send + Sync {
    fn emit(&self, result: &ScanResult);
}

impl<F> ResultSink for F
where
    F: Fn(&ScanResult) + Send + Sync,
{
    fn emit(&self, result: &ScanResult) {
        self(result)
    }
}
