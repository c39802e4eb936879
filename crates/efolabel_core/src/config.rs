//! Store configuration.
//!
//! # Responsibility
//! - Pick the storage adapter and its location from explicit values or
//!   environment variables.
//!
//! # Invariants
//! - Blank values fall back to defaults; unknown backend names are rejected.

use crate::error::{LabelError, LabelResult};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable selecting the adapter (`sqlite` or `local`).
pub const STORE_ENV: &str = "EFOLABEL_STORE";
/// Environment variable overriding the database/document path.
pub const DB_PATH_ENV: &str = "EFOLABEL_DB_PATH";

const SQLITE_FILE_NAME: &str = "efolabel.sqlite3";
const LOCAL_FILE_NAME: &str = "efolabel_data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Relational tables in a SQLite file.
    #[default]
    Sqlite,
    /// Single JSON document.
    LocalFile,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::LocalFile => "local",
        }
    }

    fn default_file_name(self) -> &'static str {
        match self {
            Self::Sqlite => SQLITE_FILE_NAME,
            Self::LocalFile => LOCAL_FILE_NAME,
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = LabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "db" => Ok(Self::Sqlite),
            "local" | "json" | "file" => Ok(Self::LocalFile),
            other => Err(LabelError::InvalidInput(format!(
                "unsupported store backend `{other}`; expected sqlite|local"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

impl StoreConfig {
    /// Builds a config; a missing or blank path uses the backend's default
    /// file in the system temp directory.
    pub fn new(backend: StoreBackend, path: Option<&str>) -> Self {
        let path = path
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(backend.default_file_name()));
        Self { backend, path }
    }

    /// Resolves `EFOLABEL_STORE` and `EFOLABEL_DB_PATH`.
    pub fn from_env() -> LabelResult<Self> {
        Self::from_values(
            std::env::var(STORE_ENV).ok().as_deref(),
            std::env::var(DB_PATH_ENV).ok().as_deref(),
        )
    }

    /// Resolves from raw (possibly blank) values.
    pub fn from_values(backend: Option<&str>, path: Option<&str>) -> LabelResult<Self> {
        let backend = match backend.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => value.parse()?,
            None => StoreBackend::default(),
        };
        Ok(Self::new(backend, path))
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreBackend, StoreConfig};
    use std::path::PathBuf;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = StoreConfig::from_values(Some("  "), Some("")).unwrap();
        assert_eq!(config.backend, StoreBackend::Sqlite);
        assert!(config.path.ends_with("efolabel.sqlite3"));
    }

    #[test]
    fn local_backend_uses_json_document() {
        let config = StoreConfig::from_values(Some("JSON"), None).unwrap();
        assert_eq!(config.backend, StoreBackend::LocalFile);
        assert!(config.path.ends_with("efolabel_data.json"));
    }

    #[test]
    fn explicit_path_is_kept() {
        let config = StoreConfig::from_values(None, Some(" /var/lib/efo/labels.db ")).unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/efo/labels.db"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = StoreConfig::from_values(Some("postgres"), None).unwrap_err();
        assert!(err.to_string().contains("unsupported store backend"));
    }
}
