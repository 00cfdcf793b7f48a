use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use super::connection::FileConnection;
use crate::storage::error::StorageResult;
use shared::Question;

/// File repository for questions: one `<id>.json` snapshot per question
#[derive(Clone)]
pub struct QuestionRepository {
    connection: Arc<FileConnection>,
}

impl QuestionRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    fn path_for(&self, id: i64) -> PathBuf {
        self.connection.questions_dir().join(format!("{id}.json"))
    }

    /// Scan the questions directory and load every snapshot, ordered by id
    pub fn load_all(&self) -> StorageResult<Vec<Question>> {
        let mut questions = Vec::new();
        for entry in fs::read_dir(self.connection.questions_dir())? {
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
            questions.push(serde_json::from_str(&content)?);
        }

        questions.sort_by_key(|q: &Question| q.id);
        Ok(questions)
    }

    pub fn exists(&self, id: i64) -> bool {
        self.path_for(id).exists()
    }

    /// Write the question snapshot (temp write, then rename)
    pub fn save(&self, id: i64, question: &Question) -> StorageResult<()> {
        let path = self.path_for(id);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, serde_json::to_string_pretty(question)?)?;
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
