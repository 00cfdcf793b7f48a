use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use super::connection::FileConnection;
use crate::storage::error::StorageResult;
use shared::Answer;

/// File repository for answers: one `<id>.json` snapshot per answer
#[derive(Clone)]
pub struct AnswerRepository {
    connection: Arc<FileConnection>,
}

impl AnswerRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    fn path_for(&self, id: i64) -> PathBuf {
        self.connection.answers_dir().join(format!("{id}.json"))
    }

    /// Scan the answers directory and load every snapshot, ordered by id
    pub fn load_all(&self) -> StorageResult<Vec<Answer>> {
        let mut answers = Vec::new();
        for entry in fs::read_dir(self.connection.answers_dir())? {
            let path = entry?.path();
            if path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<i64>().ok())
                .is_none()
            {
                debug!("Skipping non-snapshot file {:?}", path);
                continue;
            }

            let content = fs::read_to_string(&path)?;
            answers.push(serde_json::from_str(&content)?);
        }

        answers.sort_by_key(|a: &Answer| a.id);
        Ok(answers)
    }

    pub fn exists(&self, id: i64) -> bool {
        self.path_for(id).exists()
    }

    /// Write the answer snapshot (temp write, then rename)
    pub fn save(&self, id: i64, answer: &Answer) -> StorageResult<()> {
        let path = self.path_for(id);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, serde_json::to_string_pretty(answer)?)?;
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
