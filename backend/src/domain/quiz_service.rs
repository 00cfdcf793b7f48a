use std::sync::Arc;

use log::{info, warn};
use rand::seq::{IndexedRandom, SliceRandom};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::QuizStorage;
use shared::{Answer, PlayerAnswer, Question, Theme};

/// Repository facade over the active storage backend.
///
/// Holds one cached collection per entity kind. Mutations delegate to the
/// backend and then reload the affected kind(s), so the cache is never stale
/// relative to the last completed mutation. The cached queries
/// (`questions_for_theme`, `answers_for_question`, ...) never hit storage.
///
/// The service is constructed with an injected backend and owned by a single
/// logical editing session; it is not synchronized for concurrent use.
pub struct QuizService {
    storage: Arc<dyn QuizStorage>,
    themes: Vec<Theme>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    player_answers: Vec<PlayerAnswer>,
}

impl QuizService {
    /// Create a service over the given backend and load all four entity
    /// kinds into the cache
    pub async fn new(storage: Arc<dyn QuizStorage>) -> StorageResult<Self> {
        let mut service = Self {
            storage,
            themes: Vec::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            player_answers: Vec::new(),
        };
        service.refresh_all().await?;

        info!(
            "Quiz service ready: {} themes, {} questions, {} answers, {} player answers",
            service.themes.len(),
            service.questions.len(),
            service.answers.len(),
            service.player_answers.len(),
        );
        Ok(service)
    }

    /// Reload every entity kind from the backend
    pub async fn refresh_all(&mut self) -> StorageResult<()> {
        self.themes = self.storage.get_all_themes().await?;
        self.questions = self.storage.get_all_questions().await?;
        self.answers = self.storage.get_all_answers().await?;
        self.player_answers = self.storage.get_all_player_answers().await?;
        Ok(())
    }

    async fn refresh_themes(&mut self) -> StorageResult<()> {
        self.themes = self.storage.get_all_themes().await?;
        Ok(())
    }

    async fn refresh_questions(&mut self) -> StorageResult<()> {
        self.questions = self.storage.get_all_questions().await?;
        Ok(())
    }

    async fn refresh_answers(&mut self) -> StorageResult<()> {
        self.answers = self.storage.get_all_answers().await?;
        Ok(())
    }

    async fn refresh_player_answers(&mut self) -> StorageResult<()> {
        self.player_answers = self.storage.get_all_player_answers().await?;
        Ok(())
    }

    /// All cached themes
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// All cached questions
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// All cached answers
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// All cached player answers (read path of the statistics module)
    pub fn player_answers(&self) -> &[PlayerAnswer] {
        &self.player_answers
    }

    /// Save a theme (allocating an id on first save) and return it
    pub async fn save_theme(&mut self, mut theme: Theme) -> StorageResult<Theme> {
        self.storage.save_theme(&mut theme).await?;
        self.refresh_themes().await?;
        Ok(theme)
    }

    /// Save a question together with its full answer set.
    ///
    /// Rejected before reaching storage when the theme id is not in the
    /// cache; the relational backend would also refuse it via its foreign
    /// key, the file backend has no constraint to fall back on.
    pub async fn save_question(
        &mut self,
        mut question: Question,
        mut answers: Vec<Answer>,
    ) -> StorageResult<(Question, Vec<Answer>)> {
        if !self.themes.iter().any(|t| t.id == Some(question.theme_id)) {
            warn!(
                "Rejecting question '{}': no theme {}",
                question.title, question.theme_id
            );
            return Err(StorageError::MissingReference {
                kind: "question",
                referenced_kind: "theme",
                referenced_id: question.theme_id,
            });
        }

        self.storage.save_question(&mut question, &mut answers).await?;
        self.refresh_questions().await?;
        self.refresh_answers().await?;
        // Replacing the answer set also removes the player answers recorded
        // against the old answers
        self.refresh_player_answers().await?;
        Ok((question, answers))
    }

    /// Save a single answer of an existing question
    pub async fn save_answer(&mut self, mut answer: Answer) -> StorageResult<Answer> {
        if !self
            .questions
            .iter()
            .any(|q| q.id == Some(answer.question_id))
        {
            return Err(StorageError::MissingReference {
                kind: "answer",
                referenced_kind: "question",
                referenced_id: answer.question_id,
            });
        }

        self.storage.save_answer(&mut answer).await?;
        self.refresh_answers().await?;
        Ok(answer)
    }

    /// Record one response event from quiz play
    pub async fn record_player_answer(
        &mut self,
        question_id: i64,
        answer_id: i64,
        selected: bool,
    ) -> StorageResult<PlayerAnswer> {
        self.save_player_answer(PlayerAnswer::new(question_id, answer_id, selected))
            .await
    }

    /// Save a player answer record (explicit update of an existing record,
    /// or an insert when the id is unset)
    pub async fn save_player_answer(
        &mut self,
        mut player_answer: PlayerAnswer,
    ) -> StorageResult<PlayerAnswer> {
        self.storage.save_player_answer(&mut player_answer).await?;
        self.refresh_player_answers().await?;
        Ok(player_answer)
    }

    /// Delete a theme and everything under it.
    ///
    /// The cache is reloaded even when the backend reports a partial
    /// cascade, so it reflects whatever the backend actually did.
    pub async fn delete_theme(&mut self, theme_id: i64) -> StorageResult<()> {
        let result = self.storage.delete_theme(theme_id).await;
        self.refresh_all().await?;
        result
    }

    /// Delete a question, its answers and its recorded player answers
    pub async fn delete_question(&mut self, question_id: i64) -> StorageResult<()> {
        let result = self.storage.delete_question(question_id).await;
        self.refresh_questions().await?;
        self.refresh_answers().await?;
        self.refresh_player_answers().await?;
        result
    }

    /// Delete an answer and the player answers that reference it
    pub async fn delete_answer(&mut self, answer_id: i64) -> StorageResult<()> {
        let result = self.storage.delete_answer(answer_id).await;
        self.refresh_answers().await?;
        self.refresh_player_answers().await?;
        result
    }

    /// Delete one recorded player answer
    pub async fn delete_player_answer(&mut self, player_answer_id: i64) -> StorageResult<()> {
        let result = self.storage.delete_player_answer(player_answer_id).await;
        self.refresh_player_answers().await?;
        result
    }

    /// Theme of a question, from the cache.
    ///
    /// A question pointing at a theme that does not exist — possible only
    /// with the file backend, which has no foreign keys to refuse it — is
    /// not auto-corrected; it surfaces here as a `NotFound` lookup failure.
    pub fn theme_of_question(&self, question_id: i64) -> StorageResult<Theme> {
        let question = self
            .questions
            .iter()
            .find(|q| q.id == Some(question_id))
            .ok_or(StorageError::NotFound {
                kind: "question",
                id: question_id,
            })?;

        self.themes
            .iter()
            .find(|t| t.id == Some(question.theme_id))
            .cloned()
            .ok_or(StorageError::NotFound {
                kind: "theme",
                id: question.theme_id,
            })
    }

    /// Questions of one theme, from the cache
    pub fn questions_for_theme(&self, theme_id: i64) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.theme_id == theme_id)
            .cloned()
            .collect()
    }

    /// Answers of one question, from the cache
    pub fn answers_for_question(&self, question_id: i64) -> Vec<Answer> {
        self.answers
            .iter()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect()
    }

    /// Answers of one question in randomized order, for quiz play
    pub fn shuffled_answers_for_question(&self, question_id: i64) -> Vec<Answer> {
        let mut answers = self.answers_for_question(question_id);
        answers.shuffle(&mut rand::rng());
        answers
    }

    /// A uniformly random question, optionally restricted to one theme
    pub fn random_question(&self, theme_id: Option<i64>) -> Option<Question> {
        match theme_id {
            Some(theme_id) => self
                .questions_for_theme(theme_id)
                .choose(&mut rand::rng())
                .cloned(),
            None => self.questions.choose(&mut rand::rng()).cloned(),
        }
    }
}
