use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};

use crate::storage::error::StorageResult;
use shared::PlayerAnswer;

/// Row mapper for the `playeranswer` table.
///
/// Timestamps are stored as RFC 3339 text and parsed back on load.
pub struct PlayerAnswerRepository;

impl PlayerAnswerRepository {
    /// Load all recorded player answers ordered by id
    pub async fn select_all(conn: &mut SqliteConnection) -> StorageResult<Vec<PlayerAnswer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, questionid, answerid, selected, created_at
            FROM playeranswer
            ORDER BY id ASC
            "#,
        )
        .fetch_all(conn)
        .await?;

        let mut player_answers = Vec::with_capacity(rows.len());
        for row in &rows {
            let created_at: String = row.get("created_at");
            let created_at = DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc);

            player_answers.push(PlayerAnswer {
                id: Some(row.get("id")),
                question_id: row.get("questionid"),
                answer_id: row.get("answerid"),
                selected: row.get("selected"),
                created_at,
            });
        }

        Ok(player_answers)
    }

    /// Insert a new player answer, assigning the generated key
    pub async fn insert(
        conn: &mut SqliteConnection,
        player_answer: &mut PlayerAnswer,
    ) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO playeranswer (questionid, answerid, selected, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(player_answer.question_id)
        .bind(player_answer.answer_id)
        .bind(player_answer.selected)
        .bind(player_answer.created_at.to_rfc3339())
        .execute(conn)
        .await?;

        player_answer.id = Some(result.last_insert_rowid());
        Ok(())
    }

    /// Update an existing player answer by id (explicit update only; records
    /// are otherwise immutable)
    pub async fn update(
        conn: &mut SqliteConnection,
        player_answer: &PlayerAnswer,
        id: i64,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE playeranswer
            SET questionid = ?, answerid = ?, selected = ?, created_at = ?
            WHERE id = ?
            "#,
        )
        .bind(player_answer.question_id)
        .bind(player_answer.answer_id)
        .bind(player_answer.selected)
        .bind(player_answer.created_at.to_rfc3339())
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete a player answer by id
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            DELETE FROM playeranswer WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
