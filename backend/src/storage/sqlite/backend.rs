use async_trait::async_trait;
use log::{debug, info};

use super::connection::DbConnection;
use super::repositories::{
    AnswerRepository, PlayerAnswerRepository, QuestionRepository, ThemeRepository,
};
use crate::storage::error::StorageResult;
use crate::storage::traits::QuizStorage;
use shared::{Answer, PlayerAnswer, Question, Theme};

/// Relational implementation of [`QuizStorage`].
///
/// Every save runs inside an explicit transaction: begin, insert or update,
/// capture the generated key on insert, commit. When any statement fails the
/// transaction is dropped and rolls back, leaving the database as it was.
/// Deletes are single statements; dependents are removed by the schema's
/// `ON DELETE CASCADE` foreign keys.
#[derive(Clone)]
pub struct SqliteBackend {
    db: DbConnection,
}

impl SqliteBackend {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Open the database at the given URL and set up the schema
    pub async fn open(url: &str) -> StorageResult<Self> {
        Ok(Self::new(DbConnection::new(url).await?))
    }
}

#[async_trait]
impl QuizStorage for SqliteBackend {
    async fn get_all_themes(&self) -> StorageResult<Vec<Theme>> {
        let mut conn = self.db.pool().acquire().await?;
        ThemeRepository::select_all(&mut conn).await
    }

    async fn get_all_questions(&self) -> StorageResult<Vec<Question>> {
        let mut conn = self.db.pool().acquire().await?;
        QuestionRepository::select_all(&mut conn).await
    }

    async fn get_all_answers(&self) -> StorageResult<Vec<Answer>> {
        let mut conn = self.db.pool().acquire().await?;
        AnswerRepository::select_all(&mut conn).await
    }

    async fn get_all_player_answers(&self) -> StorageResult<Vec<PlayerAnswer>> {
        let mut conn = self.db.pool().acquire().await?;
        PlayerAnswerRepository::select_all(&mut conn).await
    }

    async fn save_theme(&self, theme: &mut Theme) -> StorageResult<()> {
        let mut tx = self.db.pool().begin().await?;
        match theme.id {
            Some(id) => ThemeRepository::update(&mut tx, theme, id).await?,
            None => ThemeRepository::insert(&mut tx, theme).await?,
        }
        tx.commit().await?;

        debug!("Saved theme {:?}: {}", theme.id, theme.title);
        Ok(())
    }

    async fn save_question(
        &self,
        question: &mut Question,
        answers: &mut Vec<Answer>,
    ) -> StorageResult<()> {
        let mut tx = self.db.pool().begin().await?;

        match question.id {
            Some(id) => QuestionRepository::update(&mut tx, question, id).await?,
            None => QuestionRepository::insert(&mut tx, question).await?,
        }
        let question_id = question.id.unwrap_or_default();

        // Replace-all-children: drop the stored answer set, persist the
        // supplied one. Answers that already carry an id keep it.
        AnswerRepository::delete_by_question(&mut tx, question_id).await?;
        for answer in answers.iter_mut() {
            answer.question_id = question_id;
            match answer.id {
                Some(id) => AnswerRepository::insert_with_id(&mut tx, answer, id).await?,
                None => AnswerRepository::insert(&mut tx, answer).await?,
            }
        }

        tx.commit().await?;

        info!(
            "Saved question {} with {} answers",
            question_id,
            answers.len()
        );
        Ok(())
    }

    async fn save_answer(&self, answer: &mut Answer) -> StorageResult<()> {
        let mut tx = self.db.pool().begin().await?;
        match answer.id {
            Some(id) => AnswerRepository::update(&mut tx, answer, id).await?,
            None => AnswerRepository::insert(&mut tx, answer).await?,
        }
        tx.commit().await?;
        Ok(())
    }

    async fn save_player_answer(&self, player_answer: &mut PlayerAnswer) -> StorageResult<()> {
        let mut tx = self.db.pool().begin().await?;
        match player_answer.id {
            Some(id) => PlayerAnswerRepository::update(&mut tx, player_answer, id).await?,
            None => PlayerAnswerRepository::insert(&mut tx, player_answer).await?,
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_theme(&self, theme_id: i64) -> StorageResult<()> {
        let mut conn = self.db.pool().acquire().await?;
        ThemeRepository::delete(&mut conn, theme_id).await?;

        info!("Deleted theme {} (dependents cascaded)", theme_id);
        Ok(())
    }

    async fn delete_question(&self, question_id: i64) -> StorageResult<()> {
        let mut conn = self.db.pool().acquire().await?;
        QuestionRepository::delete(&mut conn, question_id).await?;

        info!("Deleted question {} (dependents cascaded)", question_id);
        Ok(())
    }

    async fn delete_answer(&self, answer_id: i64) -> StorageResult<()> {
        let mut conn = self.db.pool().acquire().await?;
        AnswerRepository::delete(&mut conn, answer_id).await
    }

    async fn delete_player_answer(&self, player_answer_id: i64) -> StorageResult<()> {
        let mut conn = self.db.pool().acquire().await?;
        PlayerAnswerRepository::delete(&mut conn, player_answer_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> SqliteBackend {
        SqliteBackend::new(DbConnection::init_test().await.unwrap())
    }

    async fn saved_theme(backend: &SqliteBackend, title: &str) -> Theme {
        let mut theme = Theme::new(title, "about");
        backend.save_theme(&mut theme).await.unwrap();
        theme
    }

    #[tokio::test]
    async fn test_save_and_get_all_round_trips_theme() {
        let backend = setup_test().await;

        let mut theme = Theme::new("Geography", "Capitals and rivers");
        backend.save_theme(&mut theme).await.unwrap();
        assert!(theme.id.is_some());

        let themes = backend.get_all_themes().await.unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0], theme);
    }

    #[tokio::test]
    async fn test_theme_ids_are_strictly_increasing() {
        let backend = setup_test().await;

        let mut previous = 0;
        for i in 0..5 {
            let theme = saved_theme(&backend, &format!("Theme {i}")).await;
            let id = theme.id.unwrap();
            assert!(id > previous, "{id} not above {previous}");
            previous = id;
        }
    }

    #[tokio::test]
    async fn test_update_does_not_duplicate() {
        let backend = setup_test().await;

        let mut theme = saved_theme(&backend, "Before").await;
        let original_id = theme.id;
        theme.title = "After".to_string();
        backend.save_theme(&mut theme).await.unwrap();

        let themes = backend.get_all_themes().await.unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].id, original_id);
        assert_eq!(themes[0].title, "After");
    }

    #[tokio::test]
    async fn test_question_save_replaces_answer_set() {
        let backend = setup_test().await;
        let theme = saved_theme(&backend, "Geography").await;

        let mut question = Question::new("Capital", "Of France?", theme.id.unwrap());
        let mut answers = vec![
            Answer::new("Paris", true, 0),
            Answer::new("Lyon", false, 0),
        ];
        backend
            .save_question(&mut question, &mut answers)
            .await
            .unwrap();
        assert!(answers.iter().all(|a| a.id.is_some()));
        assert!(answers
            .iter()
            .all(|a| a.question_id == question.id.unwrap()));

        // Re-save with a different set; the old rows must be gone
        let mut replacement = vec![Answer::new("Paris", true, 0)];
        backend
            .save_question(&mut question, &mut replacement)
            .await
            .unwrap();

        let stored = backend.get_all_answers().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "Paris");
    }

    #[tokio::test]
    async fn test_answer_replacement_drops_recorded_player_answers() {
        let backend = setup_test().await;
        let theme = saved_theme(&backend, "Geography").await;

        let mut question = Question::new("Capital", "Of France?", theme.id.unwrap());
        let mut answers = vec![Answer::new("Paris", true, 0)];
        backend
            .save_question(&mut question, &mut answers)
            .await
            .unwrap();

        let mut recorded = PlayerAnswer::new(question.id.unwrap(), answers[0].id.unwrap(), true);
        backend.save_player_answer(&mut recorded).await.unwrap();

        let mut replacement = vec![Answer::new("Lyon", false, 0)];
        backend
            .save_question(&mut question, &mut replacement)
            .await
            .unwrap();

        // The record pointed at a replaced answer and goes with it
        assert!(backend.get_all_player_answers().await.unwrap().is_empty());
        let stored = backend.get_all_answers().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "Lyon");
    }

    #[tokio::test]
    async fn test_question_with_missing_theme_is_rejected() {
        let backend = setup_test().await;

        let mut question = Question::new("Orphan", "No theme", 42);
        let result = backend.save_question(&mut question, &mut Vec::new()).await;
        assert!(result.is_err());

        assert!(backend.get_all_questions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_answer_delete() {
        let backend = setup_test().await;
        let theme = saved_theme(&backend, "Geography").await;

        let mut question = Question::new("Capital", "Of France?", theme.id.unwrap());
        let mut answers = vec![Answer::new("Paris", true, 0)];
        backend
            .save_question(&mut question, &mut answers)
            .await
            .unwrap();

        // Point the question at a missing theme; the whole re-save must roll
        // back, including the delete of the old answer set
        question.theme_id = 42;
        let mut replacement = vec![Answer::new("Lyon", false, 0)];
        assert!(backend
            .save_question(&mut question, &mut replacement)
            .await
            .is_err());

        let stored = backend.get_all_answers().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "Paris");
    }

    #[tokio::test]
    async fn test_delete_theme_cascades_to_questions_and_answers() {
        let backend = setup_test().await;
        let theme = saved_theme(&backend, "Geography").await;
        let theme_id = theme.id.unwrap();

        for i in 0..2 {
            let mut question = Question::new(format!("Q{i}"), "text", theme_id);
            let mut answers = vec![
                Answer::new("right", true, 0),
                Answer::new("wrong", false, 0),
            ];
            backend
                .save_question(&mut question, &mut answers)
                .await
                .unwrap();

            let mut recorded =
                PlayerAnswer::new(question.id.unwrap(), answers[0].id.unwrap(), true);
            backend.save_player_answer(&mut recorded).await.unwrap();
        }

        backend.delete_theme(theme_id).await.unwrap();

        assert!(backend.get_all_questions().await.unwrap().is_empty());
        assert!(backend.get_all_answers().await.unwrap().is_empty());
        assert!(backend.get_all_player_answers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_question_leaves_siblings_alone() {
        let backend = setup_test().await;
        let theme = saved_theme(&backend, "Geography").await;
        let theme_id = theme.id.unwrap();

        let mut doomed = Question::new("Doomed", "text", theme_id);
        let mut doomed_answers = vec![Answer::new("a", false, 0)];
        backend
            .save_question(&mut doomed, &mut doomed_answers)
            .await
            .unwrap();

        let mut sibling = Question::new("Sibling", "text", theme_id);
        let mut sibling_answers = vec![Answer::new("b", true, 0)];
        backend
            .save_question(&mut sibling, &mut sibling_answers)
            .await
            .unwrap();

        backend.delete_question(doomed.id.unwrap()).await.unwrap();

        let answers = backend.get_all_answers().await.unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].question_id, sibling.id.unwrap());
    }

    #[tokio::test]
    async fn test_player_answer_round_trip() {
        let backend = setup_test().await;
        let theme = saved_theme(&backend, "Geography").await;

        let mut question = Question::new("Capital", "Of France?", theme.id.unwrap());
        let mut answers = vec![Answer::new("Paris", true, 0)];
        backend
            .save_question(&mut question, &mut answers)
            .await
            .unwrap();

        let mut recorded = PlayerAnswer::new(question.id.unwrap(), answers[0].id.unwrap(), true);
        backend.save_player_answer(&mut recorded).await.unwrap();

        let stored = backend.get_all_player_answers().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, recorded.id);
        assert_eq!(stored[0].answer_id, recorded.answer_id);
        assert_eq!(
            stored[0].created_at.timestamp_millis(),
            recorded.created_at.timestamp_millis()
        );
    }
}
