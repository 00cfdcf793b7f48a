use sqlx::{Row, SqliteConnection};

use crate::storage::error::StorageResult;
use shared::Theme;

/// Row mapper for the `theme` table
pub struct ThemeRepository;

impl ThemeRepository {
    /// Load all themes ordered by id
    pub async fn select_all(conn: &mut SqliteConnection) -> StorageResult<Vec<Theme>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, text
            FROM theme
            ORDER BY id ASC
            "#,
        )
        .fetch_all(conn)
        .await?;

        let themes = rows
            .iter()
            .map(|row| Theme {
                id: Some(row.get("id")),
                title: row.get("title"),
                text: row.get("text"),
            })
            .collect();

        Ok(themes)
    }

    /// Insert a new theme, assigning the generated key to `theme.id`
    pub async fn insert(conn: &mut SqliteConnection, theme: &mut Theme) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO theme (title, text)
            VALUES (?, ?)
            "#,
        )
        .bind(&theme.title)
        .bind(&theme.text)
        .execute(conn)
        .await?;

        theme.id = Some(result.last_insert_rowid());
        Ok(())
    }

    /// Update an existing theme by id
    pub async fn update(conn: &mut SqliteConnection, theme: &Theme, id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE theme
            SET title = ?, text = ?
            WHERE id = ?
            "#,
        )
        .bind(&theme.title)
        .bind(&theme.text)
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Delete a theme by id; dependents go with it via `ON DELETE CASCADE`
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> StorageResult<()> {
        sqlx::query(
            r#"
            DELETE FROM theme WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
