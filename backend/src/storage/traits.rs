//! # Storage Traits
//!
//! This module defines the storage abstraction trait that allows the two
//! storage backends to be used interchangeably by the domain layer.
//!
//! All writes take the entity by `&mut` so that a first save can assign the
//! storage-generated id in place (relational backends capture the generated
//! key, the file backend allocates from its watermark).

use async_trait::async_trait;

use super::error::StorageResult;
use shared::{Answer, PlayerAnswer, Question, Theme};

/// Uniform contract implemented by both storage backends.
///
/// The working set is assumed to fit in memory, so the `get_all_*` operations
/// return full collections without pagination. No method panics or leaks a
/// backend-specific error type; every failure is a [`StorageResult`].
#[async_trait]
pub trait QuizStorage: Send + Sync {
    /// Load every stored theme
    async fn get_all_themes(&self) -> StorageResult<Vec<Theme>>;

    /// Load every stored question
    async fn get_all_questions(&self) -> StorageResult<Vec<Question>>;

    /// Load every stored answer
    async fn get_all_answers(&self) -> StorageResult<Vec<Answer>>;

    /// Load every recorded player answer
    async fn get_all_player_answers(&self) -> StorageResult<Vec<PlayerAnswer>>;

    /// Insert (id unset, assigning a fresh id) or update (id set) a theme
    async fn save_theme(&self, theme: &mut Theme) -> StorageResult<()>;

    /// Upsert a question together with its full answer set.
    ///
    /// Previously stored answers of the question are removed and the supplied
    /// set is persisted in their place (replace-all-children, no diffing).
    /// Each answer gets its `question_id` pointed at the saved question and,
    /// when new, a fresh id.
    async fn save_question(
        &self,
        question: &mut Question,
        answers: &mut Vec<Answer>,
    ) -> StorageResult<()>;

    /// Insert or update a single answer of an existing question
    async fn save_answer(&self, answer: &mut Answer) -> StorageResult<()>;

    /// Insert or update a recorded player answer
    async fn save_player_answer(&self, player_answer: &mut PlayerAnswer) -> StorageResult<()>;

    /// Delete a theme and cascade to its questions, their answers, and any
    /// player answers recorded against them
    async fn delete_theme(&self, theme_id: i64) -> StorageResult<()>;

    /// Delete a question and cascade to its answers and player answers
    async fn delete_question(&self, question_id: i64) -> StorageResult<()>;

    /// Delete an answer and cascade to player answers that reference it
    async fn delete_answer(&self, answer_id: i64) -> StorageResult<()>;

    /// Delete a single recorded player answer
    async fn delete_player_answer(&self, player_answer_id: i64) -> StorageResult<()>;
}
