//! Target Resolver - subdomain input loading
//!
//! Turns the CLI inputs into the ordered list of subdomains to probe.
//! Supported sources:
//! - a single subdomain argument: "shop.example.com"
//! - a list file, one subdomain per line; blank lines and lines starting
//!   with `#` are ignored
//!
//! Order and duplicates are preserved; each line becomes one probe.

use std::path::Path;
use tracing::debug;

use subtake_common::{SubtakeError, SubtakeResult};

pub struct TargetResolver;

impl TargetResolver {
    pub fn new() -> Self {
        Self
    }

    /// Pick the subdomain source. A list file wins over the positional
    /// argument; having neither is a configuration error.
    pub async fn resolve(subdomain: Option<&str>, list: Option<&Path>) -> SubtakeResult<Vec<String>> {
        match (list, subdomain) {
            (Some(path), _) => Self::from_file(path).await,
            (None, Some(single)) => Self::from_argument(single),
            (None, None) => Err(SubtakeError::Config(
                "must provide either a subdomain argument or use -l/--list".into(),
            )),
        }
    }

    pub fn from_argument(subdomain: &str) -> SubtakeResult<Vec<String>> {
        let subdomain = subdomain.trim();
        if subdomain.is_empty() {
            return Err(SubtakeError::Config("subdomain argument is empty".into()));
        }
        Ok(vec![subdomain.to_string()])
    }

    /// Read a subdomain list file. Unreadable files and files with no
    /// usable lines are errors.
    pub async fn from_file(path: &Path) -> SubtakeResult<Vec<String>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SubtakeError::SubdomainListLoad(format!("{}: {}", path.display(), e)))?;

        let subdomains = parse_list(&content);
        if subdomains.is_empty() {
            return Err(SubtakeError::SubdomainListLoad(format!(
                "{}: no subdomains found",
                path.display()
            )));
        }

        debug!("loaded {} subdomains from {}", subdomains.len(), path.display());
        Ok(subdomains)
    }
}

/// Trimmed, non-blank, non-comment lines in file order.
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new()
    }
}
