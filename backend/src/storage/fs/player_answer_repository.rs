use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use super::connection::FileConnection;
use crate::storage::error::StorageResult;
use shared::PlayerAnswer;

/// File repository for recorded player answers: one `<id>.json` per record
#[derive(Clone)]
pub struct PlayerAnswerRepository {
    connection: Arc<FileConnection>,
}

impl PlayerAnswerRepository {
    pub fn new(connection: Arc<FileConnection>) -> Self {
        Self { connection }
    }

    fn path_for(&self, id: i64) -> PathBuf {
        self.connection
            .player_answers_dir()
            .join(format!("{id}.json"))
    }

    /// Scan the player answers directory and load every record, ordered by id
    pub fn load_all(&self) -> StorageResult<Vec<PlayerAnswer>> {
        let mut player_answers = Vec::new();
        for entry in fs::read_dir(self.connection.player_answers_dir())? {
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
            player_answers.push(serde_json::from_str(&content)?);
        }

        player_answers.sort_by_key(|p: &PlayerAnswer| p.id);
        Ok(player_answers)
    }

    /// Write the record snapshot (temp write, then rename)
    pub fn save(&self, id: i64, player_answer: &PlayerAnswer) -> StorageResult<()> {
        let path = self.path_for(id);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, serde_json::to_string_pretty(player_answer)?)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Remove the record; deleting an id that is already gone succeeds
    pub fn delete(&self, id: i64) -> StorageResult<()> {
        let path = self.path_for(id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
