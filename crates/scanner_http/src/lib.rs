//! HTTP takeover scanner
//!
//! - `fetcher`: one logical GET with retries, redirects and body shaping
//! - `body`: gzip sniffing and head/tail truncation
//! - `scanner`: dual-protocol probe and classification

pub mod body;
pub mod fetcher;
pub mod scanner;

pub use fetcher::{HttpFetcher, MAX_REDIRECTS};
pub use scanner::{HttpScanner, BOTH_PROTOCOLS_FAILED};
