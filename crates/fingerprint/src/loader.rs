//! Custom fingerprint file loading (JSON or YAML)

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use subtake_common::{Fingerprint, SubtakeError, SubtakeResult};

use crate::catalog::FingerprintCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// `.json` (any case) is JSON, everything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => CatalogFormat::Json,
            _ => CatalogFormat::Yaml,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    fingerprints: Vec<Fingerprint>,
}

pub fn parse_fingerprints(content: &str, format: CatalogFormat) -> SubtakeResult<Vec<Fingerprint>> {
    let file: CatalogFile = match format {
        CatalogFormat::Json => serde_json::from_str(content)
            .map_err(|e| SubtakeError::CatalogLoad(format!("failed to parse fingerprints file: {}", e)))?,
        CatalogFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| SubtakeError::CatalogLoad(format!("failed to parse fingerprints file: {}", e)))?,
    };
    Ok(file.fingerprints)
}

pub async fn load_fingerprints_file(path: &Path) -> SubtakeResult<Vec<Fingerprint>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SubtakeError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
    let fingerprints = parse_fingerprints(&content, CatalogFormat::from_path(path))?;
    debug!(
        "Loaded {} custom fingerprints from {}",
        fingerprints.len(),
        path.display()
    );
    Ok(fingerprints)
}

/// Built-in catalog, plus the entries of `custom_file` appended when given.
pub async fn load_catalog(custom_file: Option<&Path>) -> SubtakeResult<FingerprintCatalog> {
    match custom_file {
        None => Ok(FingerprintCatalog::builtin()),
        Some(path) => {
            let custom = load_fingerprints_file(path).await?;
            Ok(FingerprintCatalog::builtin_with(custom))
        }
    }
}
