use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use crate::storage::error::{StorageError, StorageResult};

/// DbConnection manages the SQLite pool and the schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if missing) the database at the given URL.
    ///
    /// Foreign keys are switched on explicitly: SQLite leaves them off by
    /// default and the delete path relies on `ON DELETE CASCADE`.
    pub async fn new(url: &str) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Connection(format!("invalid database url {url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(format!("cannot open {url}: {e}")))?;

        Self::setup_schema(&pool)
            .await
            .map_err(|e| StorageError::Connection(format!("schema setup failed: {e}")))?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> StorageResult<Self> {
        // Unique shared-cache name so every pool connection sees the same
        // in-memory database
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS theme (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS question (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                themeid INTEGER NOT NULL REFERENCES theme(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS answer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                iscorrect INTEGER NOT NULL,
                questionid INTEGER NOT NULL REFERENCES question(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS playeranswer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                questionid INTEGER NOT NULL REFERENCES question(id) ON DELETE CASCADE,
                answerid INTEGER NOT NULL REFERENCES answer(id) ON DELETE CASCADE,
                selected INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Indexes for the foreign-key filters used by bulk loads and cascades
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_question_themeid ON question(themeid);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_answer_questionid ON answer(questionid);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_playeranswer_questionid ON playeranswer(questionid);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_setup_is_idempotent() {
        let db = DbConnection::init_test().await.unwrap();
        // A second run over the same pool must not fail
        DbConnection::setup_schema(db.pool()).await.unwrap();
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = DbConnection::init_test().await.unwrap();

        let result = sqlx::query("INSERT INTO question (title, text, themeid) VALUES (?, ?, ?)")
            .bind("orphan")
            .bind("no such theme")
            .bind(999_i64)
            .execute(db.pool())
            .await;

        assert!(result.is_err());
    }
}
