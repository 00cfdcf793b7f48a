use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, info, warn};

use super::answer_repository::AnswerRepository;
use super::connection::FileConnection;
use super::id_alloc::IdAllocator;
use super::player_answer_repository::PlayerAnswerRepository;
use super::question_repository::QuestionRepository;
use super::theme_repository::ThemeRepository;
use crate::storage::cascade::{self, CascadePlan};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::QuizStorage;
use shared::{Answer, PlayerAnswer, Question, Theme};

/// Per-kind watermark allocators, guarded together
struct IdTable {
    themes: IdAllocator,
    questions: IdAllocator,
    answers: IdAllocator,
    player_answers: IdAllocator,
}

/// Per-entity-file implementation of [`QuizStorage`].
///
/// Referential integrity has no database to lean on here: owner existence is
/// checked before every save, ids come from watermark allocators seeded by a
/// directory scan at open, and cascading deletes execute a [`CascadePlan`]
/// file by file. A cascade that fails partway returns
/// [`StorageError::PartialCascade`]; deletes are idempotent, so running the
/// same delete again retries exactly the leftovers.
pub struct FileBackend {
    themes: ThemeRepository,
    questions: QuestionRepository,
    answers: AnswerRepository,
    player_answers: PlayerAnswerRepository,
    ids: Mutex<IdTable>,
}

impl FileBackend {
    /// Open the data directory, creating the layout if missing, and seed the
    /// id watermarks from the files already present
    pub fn open(base: impl AsRef<Path>) -> StorageResult<Self> {
        let connection = Arc::new(FileConnection::new(base)?);

        let ids = IdTable {
            themes: IdAllocator::scan_directory(&connection.themes_dir())?,
            questions: IdAllocator::scan_directory(&connection.questions_dir())?,
            answers: IdAllocator::scan_directory(&connection.answers_dir())?,
            player_answers: IdAllocator::scan_directory(&connection.player_answers_dir())?,
        };

        info!(
            "Opened file backend at {:?} (watermarks: themes={}, questions={}, answers={}, player answers={})",
            connection.base_directory(),
            ids.themes.watermark(),
            ids.questions.watermark(),
            ids.answers.watermark(),
            ids.player_answers.watermark(),
        );

        Ok(Self {
            themes: ThemeRepository::new(Arc::clone(&connection)),
            questions: QuestionRepository::new(Arc::clone(&connection)),
            answers: AnswerRepository::new(Arc::clone(&connection)),
            player_answers: PlayerAnswerRepository::new(connection),
            ids: Mutex::new(ids),
        })
    }

    fn ids(&self) -> MutexGuard<'_, IdTable> {
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delete every dependent named by the plan, children before owners.
    ///
    /// Failures are logged and counted, not short-circuited, so one stuck
    /// file does not stop the rest of the cascade.
    fn execute_plan(&self, plan: &CascadePlan, deleted: &mut usize, failed: &mut usize) {
        for &id in &plan.player_answer_ids {
            match self.player_answers.delete(id) {
                Ok(()) => *deleted += 1,
                Err(e) => {
                    warn!("Leaving player answer {} behind: {}", id, e);
                    *failed += 1;
                }
            }
        }
        for &id in &plan.answer_ids {
            match self.answers.delete(id) {
                Ok(()) => *deleted += 1,
                Err(e) => {
                    warn!("Leaving answer {} behind: {}", id, e);
                    *failed += 1;
                }
            }
        }
        for &id in &plan.question_ids {
            match self.questions.delete(id) {
                Ok(()) => *deleted += 1,
                Err(e) => {
                    warn!("Leaving question {} behind: {}", id, e);
                    *failed += 1;
                }
            }
        }
    }
}

#[async_trait]
impl QuizStorage for FileBackend {
    async fn get_all_themes(&self) -> StorageResult<Vec<Theme>> {
        let themes = self.themes.load_all()?;
        // Reloads refresh the watermark, covering files written by an
        // earlier process over the same directory
        let mut ids = self.ids();
        for theme in &themes {
            if let Some(id) = theme.id {
                ids.themes.observe(id);
            }
        }
        Ok(themes)
    }

    async fn get_all_questions(&self) -> StorageResult<Vec<Question>> {
        let questions = self.questions.load_all()?;
        let mut ids = self.ids();
        for question in &questions {
            if let Some(id) = question.id {
                ids.questions.observe(id);
            }
        }
        Ok(questions)
    }

    async fn get_all_answers(&self) -> StorageResult<Vec<Answer>> {
        let answers = self.answers.load_all()?;
        let mut ids = self.ids();
        for answer in &answers {
            if let Some(id) = answer.id {
                ids.answers.observe(id);
            }
        }
        Ok(answers)
    }

    async fn get_all_player_answers(&self) -> StorageResult<Vec<PlayerAnswer>> {
        let player_answers = self.player_answers.load_all()?;
        let mut ids = self.ids();
        for player_answer in &player_answers {
            if let Some(id) = player_answer.id {
                ids.player_answers.observe(id);
            }
        }
        Ok(player_answers)
    }

    async fn save_theme(&self, theme: &mut Theme) -> StorageResult<()> {
        let id = {
            let mut ids = self.ids();
            match theme.id {
                Some(id) => {
                    ids.themes.observe(id);
                    id
                }
                None => ids.themes.allocate(),
            }
        };
        theme.id = Some(id);

        self.themes.save(id, theme)?;
        debug!("Saved theme {}: {}", id, theme.title);
        Ok(())
    }

    async fn save_question(
        &self,
        question: &mut Question,
        answers: &mut Vec<Answer>,
    ) -> StorageResult<()> {
        // No foreign keys here: the owning theme must be checked by hand
        if !self.themes.exists(question.theme_id) {
            return Err(StorageError::MissingReference {
                kind: "question",
                referenced_kind: "theme",
                referenced_id: question.theme_id,
            });
        }

        let question_id = {
            let mut ids = self.ids();
            match question.id {
                Some(id) => {
                    ids.questions.observe(id);
                    id
                }
                None => ids.questions.allocate(),
            }
        };
        question.id = Some(question_id);

        // Replace-all-children: drop the stored answer set, and with it the
        // player answers recorded against those answers, exactly as the
        // relational backend's foreign keys do when the rows are replaced
        let stored_answers = self.answers.load_all()?;
        let player_answers = self.player_answers.load_all()?;
        let plan = cascade::for_question(question_id, &stored_answers, &player_answers);

        let mut deleted = 0;
        let mut failed = 0;
        self.execute_plan(&plan, &mut deleted, &mut failed);
        if failed > 0 {
            return Err(StorageError::PartialCascade { deleted, failed });
        }

        self.questions.save(question_id, question)?;

        for answer in answers.iter_mut() {
            answer.question_id = question_id;
            let id = {
                let mut ids = self.ids();
                match answer.id {
                    Some(id) => {
                        ids.answers.observe(id);
                        id
                    }
                    None => ids.answers.allocate(),
                }
            };
            answer.id = Some(id);
            self.answers.save(id, answer)?;
        }

        info!(
            "Saved question {} with {} answers",
            question_id,
            answers.len()
        );
        Ok(())
    }

    async fn save_answer(&self, answer: &mut Answer) -> StorageResult<()> {
        if !self.questions.exists(answer.question_id) {
            return Err(StorageError::MissingReference {
                kind: "answer",
                referenced_kind: "question",
                referenced_id: answer.question_id,
            });
        }

        let id = {
            let mut ids = self.ids();
            match answer.id {
                Some(id) => {
                    ids.answers.observe(id);
                    id
                }
                None => ids.answers.allocate(),
            }
        };
        answer.id = Some(id);

        self.answers.save(id, answer)
    }

    async fn save_player_answer(&self, player_answer: &mut PlayerAnswer) -> StorageResult<()> {
        if !self.questions.exists(player_answer.question_id) {
            return Err(StorageError::MissingReference {
                kind: "player answer",
                referenced_kind: "question",
                referenced_id: player_answer.question_id,
            });
        }
        if !self.answers.exists(player_answer.answer_id) {
            return Err(StorageError::MissingReference {
                kind: "player answer",
                referenced_kind: "answer",
                referenced_id: player_answer.answer_id,
            });
        }

        let id = {
            let mut ids = self.ids();
            match player_answer.id {
                Some(id) => {
                    ids.player_answers.observe(id);
                    id
                }
                None => ids.player_answers.allocate(),
            }
        };
        player_answer.id = Some(id);

        self.player_answers.save(id, player_answer)
    }

    async fn delete_theme(&self, theme_id: i64) -> StorageResult<()> {
        let questions = self.questions.load_all()?;
        let answers = self.answers.load_all()?;
        let player_answers = self.player_answers.load_all()?;
        let plan = cascade::for_theme(theme_id, &questions, &answers, &player_answers);

        let mut deleted = 0;
        let mut failed = 0;
        self.execute_plan(&plan, &mut deleted, &mut failed);

        // The root goes last, and only once every dependent is gone; a
        // retried delete finds the same plan from the leftovers
        if failed == 0 {
            match self.themes.delete(theme_id) {
                Ok(()) => {
                    info!("Deleted theme {} and {} dependents", theme_id, deleted);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Leaving theme {} behind: {}", theme_id, e);
                    failed += 1;
                }
            }
        }

        Err(StorageError::PartialCascade { deleted, failed })
    }

    async fn delete_question(&self, question_id: i64) -> StorageResult<()> {
        let answers = self.answers.load_all()?;
        let player_answers = self.player_answers.load_all()?;
        let plan = cascade::for_question(question_id, &answers, &player_answers);

        let mut deleted = 0;
        let mut failed = 0;
        self.execute_plan(&plan, &mut deleted, &mut failed);

        if failed == 0 {
            match self.questions.delete(question_id) {
                Ok(()) => {
                    info!("Deleted question {} and {} dependents", question_id, deleted);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Leaving question {} behind: {}", question_id, e);
                    failed += 1;
                }
            }
        }

        Err(StorageError::PartialCascade { deleted, failed })
    }

    async fn delete_answer(&self, answer_id: i64) -> StorageResult<()> {
        let player_answers = self.player_answers.load_all()?;
        let plan = cascade::for_answer(answer_id, &player_answers);

        let mut deleted = 0;
        let mut failed = 0;
        self.execute_plan(&plan, &mut deleted, &mut failed);

        if failed == 0 {
            match self.answers.delete(answer_id) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("Leaving answer {} behind: {}", answer_id, e);
                    failed += 1;
                }
            }
        }

        Err(StorageError::PartialCascade { deleted, failed })
    }

    async fn delete_player_answer(&self, player_answer_id: i64) -> StorageResult<()> {
        self.player_answers.delete(player_answer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::TestHelper;
    use super::*;

    async fn saved_theme(backend: &FileBackend, title: &str) -> Theme {
        let mut theme = Theme::new(title, "about");
        backend.save_theme(&mut theme).await.unwrap();
        theme
    }

    async fn saved_question(
        backend: &FileBackend,
        theme_id: i64,
        title: &str,
    ) -> (Question, Vec<Answer>) {
        let mut question = Question::new(title, "text", theme_id);
        let mut answers = vec![
            Answer::new("right", true, 0),
            Answer::new("wrong", false, 0),
        ];
        backend
            .save_question(&mut question, &mut answers)
            .await
            .unwrap();
        (question, answers)
    }

    #[tokio::test]
    async fn test_save_and_get_all_round_trips_theme() {
        let helper = TestHelper::new().unwrap();

        let mut theme = Theme::new("Geography", "Capitals and rivers");
        helper.backend.save_theme(&mut theme).await.unwrap();
        assert_eq!(theme.id, Some(1));

        let themes = helper.backend.get_all_themes().await.unwrap();
        assert_eq!(themes, vec![theme]);
    }

    #[tokio::test]
    async fn test_ids_are_strictly_increasing_per_kind() {
        let helper = TestHelper::new().unwrap();

        for expected in 1..=4 {
            let theme = saved_theme(&helper.backend, &format!("T{expected}")).await;
            assert_eq!(theme.id, Some(expected));
        }
    }

    #[tokio::test]
    async fn test_update_does_not_duplicate() {
        let helper = TestHelper::new().unwrap();

        let mut theme = saved_theme(&helper.backend, "Before").await;
        theme.title = "After".to_string();
        helper.backend.save_theme(&mut theme).await.unwrap();

        let themes = helper.backend.get_all_themes().await.unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].title, "After");
    }

    #[tokio::test]
    async fn test_watermark_is_not_lowered_by_deletes() {
        let helper = TestHelper::new().unwrap();

        saved_theme(&helper.backend, "First").await;
        let second = saved_theme(&helper.backend, "Second").await;
        helper
            .backend
            .delete_theme(second.id.unwrap())
            .await
            .unwrap();

        // Freed ids are not reclaimed within a session
        let third = saved_theme(&helper.backend, "Third").await;
        assert_eq!(third.id, Some(3));
    }

    #[tokio::test]
    async fn test_watermark_is_rebuilt_from_directory_scan_on_reopen() {
        let helper = TestHelper::new().unwrap();

        for i in 0..3 {
            saved_theme(&helper.backend, &format!("T{i}")).await;
        }

        let reopened = helper.reopen().unwrap();
        let next = saved_theme(&reopened, "Next").await;
        assert_eq!(next.id, Some(4));
    }

    #[tokio::test]
    async fn test_question_with_missing_theme_is_rejected() {
        let helper = TestHelper::new().unwrap();

        let mut question = Question::new("Orphan", "No theme", 42);
        let result = helper
            .backend
            .save_question(&mut question, &mut Vec::new())
            .await;

        assert!(matches!(
            result,
            Err(StorageError::MissingReference {
                referenced_kind: "theme",
                referenced_id: 42,
                ..
            })
        ));
        assert!(helper.backend.get_all_questions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_question_save_replaces_answer_set() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;

        let (mut question, answers) =
            saved_question(&helper.backend, theme.id.unwrap(), "Capital").await;
        assert_eq!(answers.len(), 2);

        let mut replacement = vec![Answer::new("Paris", true, 0)];
        helper
            .backend
            .save_question(&mut question, &mut replacement)
            .await
            .unwrap();

        let stored = helper.backend.get_all_answers().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "Paris");
        // The new answer id continues past the replaced ones
        assert!(stored[0].id.unwrap() > answers[1].id.unwrap());
    }

    #[tokio::test]
    async fn test_answer_replacement_drops_recorded_player_answers() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;
        let (mut question, answers) =
            saved_question(&helper.backend, theme.id.unwrap(), "Capital").await;

        let mut recorded = PlayerAnswer::new(question.id.unwrap(), answers[0].id.unwrap(), true);
        helper
            .backend
            .save_player_answer(&mut recorded)
            .await
            .unwrap();

        let mut replacement = vec![Answer::new("Lyon", false, 0)];
        helper
            .backend
            .save_question(&mut question, &mut replacement)
            .await
            .unwrap();

        // Same outcome as the relational foreign keys: the record pointed at
        // a replaced answer and goes with it
        assert!(helper
            .backend
            .get_all_player_answers()
            .await
            .unwrap()
            .is_empty());
        let stored = helper.backend.get_all_answers().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "Lyon");
    }

    #[tokio::test]
    async fn test_resaved_answer_keeps_its_id() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;

        let (mut question, mut answers) =
            saved_question(&helper.backend, theme.id.unwrap(), "Capital").await;
        let original_ids: Vec<_> = answers.iter().map(|a| a.id).collect();

        answers[0].text = "edited".to_string();
        helper
            .backend
            .save_question(&mut question, &mut answers)
            .await
            .unwrap();

        let stored = helper.backend.get_all_answers().await.unwrap();
        assert_eq!(
            stored.iter().map(|a| a.id).collect::<Vec<_>>(),
            original_ids
        );
    }

    #[tokio::test]
    async fn test_player_answer_requires_existing_question_and_answer() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;
        let (question, answers) =
            saved_question(&helper.backend, theme.id.unwrap(), "Capital").await;

        let mut dangling = PlayerAnswer::new(question.id.unwrap(), 999, true);
        assert!(helper
            .backend
            .save_player_answer(&mut dangling)
            .await
            .is_err());

        let mut valid = PlayerAnswer::new(question.id.unwrap(), answers[0].id.unwrap(), true);
        helper.backend.save_player_answer(&mut valid).await.unwrap();
        assert_eq!(valid.id, Some(1));
    }

    #[tokio::test]
    async fn test_delete_theme_cascades_to_all_dependents() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;
        let theme_id = theme.id.unwrap();

        for i in 0..2 {
            let (question, answers) =
                saved_question(&helper.backend, theme_id, &format!("Q{i}")).await;
            let mut recorded =
                PlayerAnswer::new(question.id.unwrap(), answers[0].id.unwrap(), true);
            helper
                .backend
                .save_player_answer(&mut recorded)
                .await
                .unwrap();
        }

        helper.backend.delete_theme(theme_id).await.unwrap();

        assert!(helper.backend.get_all_themes().await.unwrap().is_empty());
        assert!(helper.backend.get_all_questions().await.unwrap().is_empty());
        assert!(helper.backend.get_all_answers().await.unwrap().is_empty());
        assert!(helper
            .backend
            .get_all_player_answers()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_question_leaves_siblings_alone() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;
        let theme_id = theme.id.unwrap();

        let (doomed, _) = saved_question(&helper.backend, theme_id, "Doomed").await;
        let (sibling, sibling_answers) =
            saved_question(&helper.backend, theme_id, "Sibling").await;

        helper
            .backend
            .delete_question(doomed.id.unwrap())
            .await
            .unwrap();

        let answers = helper.backend.get_all_answers().await.unwrap();
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(|a| a.question_id == sibling.id.unwrap()));
        assert_eq!(answers[0].id, sibling_answers[0].id);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let helper = TestHelper::new().unwrap();
        let theme = saved_theme(&helper.backend, "Geography").await;
        let theme_id = theme.id.unwrap();

        helper.backend.delete_theme(theme_id).await.unwrap();
        // Nothing left to delete, and that is fine
        helper.backend.delete_theme(theme_id).await.unwrap();
    }
}
