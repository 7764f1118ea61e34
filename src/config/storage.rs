//! Storage configuration (case catalog and history log locations)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

/// File locations used by the engine
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Case catalog file (`.json`, `.yaml` or `.yml`)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Append-only history log (JSON Lines)
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Directory exported reports are written to
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.catalog_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__CATALOG_PATH"));
        }
        if self.history_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__HISTORY_PATH"));
        }

        let extension = catalog_extension(&self.catalog_path);
        if !matches!(extension.as_str(), "json" | "yaml" | "yml") {
            return Err(ValidationError::UnsupportedCatalogFormat(extension));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            history_path: default_history_path(),
            reports_dir: default_reports_dir(),
        }
    }
}

fn catalog_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/cases.json")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/history.jsonl")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}
