//! # Quizsmith Backend
//!
//! Repository/cache core of the quiz-content editor. Sits between the entity
//! model (`shared`) and two interchangeable storage backends:
//!
//! - a relational SQLite backend (`storage::sqlite`), where cascading deletes
//!   come from foreign-key constraints, and
//! - a per-entity file backend (`storage::fs`), where id allocation and
//!   cascades are implemented in application code.
//!
//! Editor panels and the statistics module consume [`QuizService`] only; they
//! never see backend-specific types. Backend choice is a configuration value
//! ([`StorageConfig`]), not a code fork.

pub mod config;
pub mod domain;
pub mod storage;

pub use config::{open_storage, BackendKind, StorageConfig};
pub use domain::QuizService;
pub use storage::{QuizStorage, StorageError, StorageResult};
