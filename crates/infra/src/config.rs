//! Configuration loading and representation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File locations used by the order engine.
///
/// Missing fields fall back to the default layout relative to the working
/// directory (`Orders/`, `Data/Products.txt`, `Data/Taxes.txt`,
/// `Backup/DataExport.txt`, `AuditLog/audit.txt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub orders_dir: PathBuf,
    pub products_file: PathBuf,
    pub taxes_file: PathBuf,
    pub export_file: PathBuf,
    pub audit_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::rooted_at("")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AppConfig {
    pub const ORDERS_DIR_VAR: &'static str = "FLOORING_ORDERS_DIR";
    pub const PRODUCTS_FILE_VAR: &'static str = "FLOORING_PRODUCTS_FILE";
    pub const TAXES_FILE_VAR: &'static str = "FLOORING_TAXES_FILE";
    pub const EXPORT_FILE_VAR: &'static str = "FLOORING_EXPORT_FILE";
    pub const AUDIT_FILE_VAR: &'static str = "FLOORING_AUDIT_FILE";

    /// The default layout under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            orders_dir: root.join("Orders"),
            products_file: root.join("Data").join("Products.txt"),
            taxes_file: root.join("Data").join("Taxes.txt"),
            export_file: root.join("Backup").join("DataExport.txt"),
            audit_file: root.join("AuditLog").join("audit.txt"),
        }
    }

    /// Load from a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults overridden by `FLOORING_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Replace each path for which `lookup` returns a non-empty value.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields: [(&str, &mut PathBuf); 5] = [
            (Self::ORDERS_DIR_VAR, &mut self.orders_dir),
            (Self::PRODUCTS_FILE_VAR, &mut self.products_file),
            (Self::TAXES_FILE_VAR, &mut self.taxes_file),
            (Self::EXPORT_FILE_VAR, &mut self.export_file),
            (Self::AUDIT_FILE_VAR, &mut self.audit_file),
        ];
        for (key, slot) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = PathBuf::from(value);
            }
        }
        self
    }
}
