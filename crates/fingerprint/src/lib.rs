//! Fingerprint Engine - takeover signature catalog and matching
//!
//! This crate provides:
//! - The built-in catalog of hosting-provider error signatures
//! - Custom catalog loading from JSON/YAML
//! - Body matching with evidence snippets

mod builtin;
mod catalog;
mod loader;

pub use builtin::BUILTIN_FINGERPRINTS;
pub use catalog::{FingerprintCatalog, SNIPPET_CONTEXT_CHARS};
pub use loader::{load_catalog, load_fingerprints_file, parse_fingerprints, CatalogFormat};
