//! Storage configuration.
//!
//! Which backend is active is a configuration value, not a code fork: the
//! rest of the application asks [`open_storage`] for an `Arc<dyn
//! QuizStorage>` and never names a concrete backend type.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::storage::error::StorageResult;
use crate::storage::fs::FileBackend;
use crate::storage::sqlite::SqliteBackend;
use crate::storage::traits::QuizStorage;

/// The storage backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Relational SQLite database
    Sqlite,
    /// Per-entity JSON files
    File,
}

/// Persistent storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Active backend
    pub backend: BackendKind,
    /// SQLite connection URL, used when `backend` is `Sqlite`
    pub database_url: String,
    /// Base data directory, used when `backend` is `File`
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizsmith");

        Self {
            backend: BackendKind::Sqlite,
            database_url: format!("sqlite:{}", base.join("quizsmith.db").display()),
            data_dir: base.join("data"),
        }
    }
}

impl StorageConfig {
    /// Load settings from a JSON config file
    pub fn load(path: &Path) -> StorageResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write settings to a JSON config file
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Open the configured backend
pub async fn open_storage(config: &StorageConfig) -> StorageResult<Arc<dyn QuizStorage>> {
    match config.backend {
        BackendKind::Sqlite => {
            info!("Opening SQLite backend at {}", config.database_url);
            Ok(Arc::new(SqliteBackend::open(&config.database_url).await?))
        }
        BackendKind::File => {
            info!("Opening file backend at {:?}", config.data_dir);
            Ok(Arc::new(FileBackend::open(&config.data_dir)?))
        }
    }
}
