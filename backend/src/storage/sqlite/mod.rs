//! # SQLite Storage Backend
//!
//! Relational implementation of the [`QuizStorage`] contract.
//!
//! Each entity kind maps to one table through a row mapper in
//! [`repositories`] that owns the SQL touching that table. Writes run inside
//! explicit transactions (commit on success, rollback on error); cascading
//! deletes come from `ON DELETE CASCADE` foreign keys, so deletes here are
//! single statements and atomic at the database level.
//!
//! [`QuizStorage`]: crate::storage::QuizStorage

pub mod backend;
pub mod connection;
pub mod repositories;

pub use backend::SqliteBackend;
pub use connection::DbConnection;
