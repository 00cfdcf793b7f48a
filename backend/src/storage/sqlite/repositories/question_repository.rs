use sqlx::{Row, SqliteConnection};

use crate::storage::error::StorageResult;
use shared::Question;

/// Row mapper for the `question` table
pub struct QuestionRepository;

impl QuestionRepository {
    /// Load all questions ordered by id
    pub async fn select_all(conn: &mut SqliteConnection) -> StorageResult<Vec<Question>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, text, themeid
            FROM question
            ORDER BY id ASC
            "#,
        )
        .fetch_all(conn)
        .await?;

        let questions = rows
            .iter()
            .map(|row| Question {
                id: Some(row.get("id")),
                title: row.get("title"),
                text: row.get("text"),
                theme_id: row.get("themeid"),
            })
            .collect();

        Ok(questions)
    }

    /// Insert a new question, assigning the generated key to `question.id`.
    ///
    /// Fails with a constraint violation when `theme_id` does not reference
    /// an existing theme.
    pub async fn insert(conn: &mut SqliteConnection, question: &mut Question) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO question (title, text, themeid)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&question.title)
        .bind(&question.text)
        .bind(question.theme_id)
        .execute(conn)
        .await?;

        question.id = Some(result.last_insert_rowid());
        Ok(())
    }

    /// Update an existing question by id
    pub async fn update(
        conn: &mut SqliteConnection,
        question: &Question,
        id: i64,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE question
            SET title = ?, text = ?, themeid = ?
            WHERE id = ?
            "#,
        )
        .bind(&question.title)
        .bind(&question.text)
        .bind(question.theme_id)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete a question by id; answers and player answers cascade
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            DELETE FROM question WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
