use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use super::connection::FileConnection;
use crate::storage::error::StorageResult;
use shared::Theme;

/// File repository for themes: one `<id>.json` snapshot per theme
#[derive(Clone)]
pub struct ThemeRepository {
    connection: Arc<FileConnection>,
}

impl ThemeRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    fn path_for(&self, id: i64) -> PathBuf {
        self.connection.themes_dir().join(format!("{id}.json"))
    }

    /// Scan the themes directory and load every snapshot, ordered by id.
    ///
    /// A snapshot that fails to parse is an error, not a skip: silently
    /// dropping a theme would hide its questions from the editor.
    pub fn load_all(&self) -> StorageResult<Vec<Theme>> {
        let mut themes = Vec::new();
        for entry in fs::read_dir(self.connection.themes_dir())? {
            let path = entry?.path();
            let id = match path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<i64>().ok())
            {
                Some(id) => id,
                None => {
                    debug!("Skipping non-snapshot file {:?}", path);
                    continue;
                }
            };

            let content = fs::read_to_string(&path)?;
            let theme: Theme = serde_json::from_str(&content)?;
            debug!("Loaded theme {} from {:?}", id, path);
            themes.push(theme);
        }

        themes.sort_by_key(|t| t.id);
        Ok(themes)
    }

    pub fn exists(&self, id: i64) -> bool {
        self.path_for(id).exists()
    }

    /// Write the theme snapshot, overwriting any existing file of that id.
    /// Atomic per file: temp write, then rename.
    pub fn save(&self, id: i64, theme: &Theme) -> StorageResult<()> {
        let path = self.path_for(id);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, serde_json::to_string_pretty(theme)?)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Remove the snapshot; deleting an id that is already gone succeeds
    pub fn delete(&self, id: i64) -> StorageResult<()> {
        let path = self.path_for(id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
