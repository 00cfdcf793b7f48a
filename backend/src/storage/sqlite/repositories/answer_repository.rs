use sqlx::{Row, SqliteConnection};

use crate::storage::error::StorageResult;
use shared::Answer;

/// Row mapper for the `answer` table
pub struct AnswerRepository;

impl AnswerRepository {
    /// Load all answers ordered by id
    pub async fn select_all(conn: &mut SqliteConnection) -> StorageResult<Vec<Answer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, iscorrect, questionid
            FROM answer
            ORDER BY id ASC
            "#,
        )
        .fetch_all(conn)
        .await?;

        let answers = rows
            .iter()
            .map(|row| Answer {
                id: Some(row.get("id")),
                text: row.get("text"),
                is_correct: row.get("iscorrect"),
                question_id: row.get("questionid"),
            })
            .collect();

        Ok(answers)
    }

    /// Insert a new answer, assigning the generated key to `answer.id`
    pub async fn insert(conn: &mut SqliteConnection, answer: &mut Answer) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO answer (text, iscorrect, questionid)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&answer.text)
        .bind(answer.is_correct)
        .bind(answer.question_id)
        .execute(conn)
        .await?;

        answer.id = Some(result.last_insert_rowid());
        Ok(())
    }

    /// Re-insert an answer under its already-assigned id, used when a
    /// question re-save replaces its answer set without renumbering the
    /// answers that survived the edit
    pub async fn insert_with_id(
        conn: &mut SqliteConnection,
        answer: &Answer,
        id: i64,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO answer (id, text, iscorrect, questionid)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&answer.text)
        .bind(answer.is_correct)
        .bind(answer.question_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Update an existing answer by id
    pub async fn update(conn: &mut SqliteConnection, answer: &Answer, id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE answer
            SET text = ?, iscorrect = ?, questionid = ?
            WHERE id = ?
            "#,
        )
        .bind(&answer.text)
        .bind(answer.is_correct)
        .bind(answer.question_id)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete an answer by id
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            DELETE FROM answer WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete every answer of a question, used when a question re-save
    /// replaces its full answer set
    pub async fn delete_by_question(
        conn: &mut SqliteConnection,
        question_id: i64,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            DELETE FROM answer WHERE questionid = ?
            "#,
        )
        .bind(question_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
