use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::storage::error::{StorageError, StorageResult};

/// Owner of the file backend's directory layout.
///
/// Creates the base directory and one subdirectory per entity kind on open;
/// repositories get their kind directory from here and never build paths on
/// their own.
#[derive(Clone)]
pub struct FileConnection {
    base: PathBuf,
}

impl FileConnection {
    /// Open (creating if missing) the data directory layout under `base`
    pub fn new(base: impl AsRef<Path>) -> StorageResult<Self> {
        let connection = Self {
            base: base.as_ref().to_path_buf(),
        };

        for dir in [
            connection.themes_dir(),
            connection.questions_dir(),
            connection.answers_dir(),
            connection.player_answers_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(|e| {
                StorageError::Connection(format!("cannot create {}: {e}", dir.display()))
            })?;
        }

        debug!("Opened file storage at {:?}", connection.base);
        Ok(connection)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.base.join("themes")
    }

    pub fn questions_dir(&self) -> PathBuf {
        self.base.join("questions")
    }

    pub fn answers_dir(&self) -> PathBuf {
        self.base.join("answers")
    }

    pub fn player_answers_dir(&self) -> PathBuf {
        self.base.join("player_answers")
    }
}
