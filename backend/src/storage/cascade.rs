//! Backend-independent cascade planning.
//!
//! The delete rules are written once here: removing a theme removes its
//! questions, their answers, and every player answer recorded against those
//! questions or answers; removing a question removes its answers and player
//! answers; removing an answer removes the player answers that reference it.
//!
//! The relational backend gets these rules for free from `ON DELETE CASCADE`
//! constraints. The file backend computes a [`CascadePlan`] from its loaded
//! entity sets and executes it file by file.

use shared::{Answer, PlayerAnswer, Question};

/// The dependent entity ids removed by one cascading delete.
///
/// The root entity itself is not part of the plan; the executor deletes it
/// after the dependents.
#[derive(Debug, Default, PartialEq)]
pub struct CascadePlan {
    pub question_ids: Vec<i64>,
    pub answer_ids: Vec<i64>,
    pub player_answer_ids: Vec<i64>,
}

impl CascadePlan {
    /// Total number of dependent entities the plan touches
    pub fn len(&self) -> usize {
        self.question_ids.len() + self.answer_ids.len() + self.player_answer_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plan the cascade for deleting the theme with the given id
pub fn for_theme(
    theme_id: i64,
    questions: &[Question],
    answers: &[Answer],
    player_answers: &[PlayerAnswer],
) -> CascadePlan {
    let question_ids: Vec<i64> = questions
        .iter()
        .filter(|q| q.theme_id == theme_id)
        .filter_map(|q| q.id)
        .collect();

    let answer_ids: Vec<i64> = answers
        .iter()
        .filter(|a| question_ids.contains(&a.question_id))
        .filter_map(|a| a.id)
        .collect();

    let player_answer_ids = player_answers
        .iter()
        .filter(|p| question_ids.contains(&p.question_id) || answer_ids.contains(&p.answer_id))
        .filter_map(|p| p.id)
        .collect();

    CascadePlan {
        question_ids,
        answer_ids,
        player_answer_ids,
    }
}

/// Plan the cascade for deleting the question with the given id
pub fn for_question(
    question_id: i64,
    answers: &[Answer],
    player_answers: &[PlayerAnswer],
) -> CascadePlan {
    let answer_ids: Vec<i64> = answers
        .iter()
        .filter(|a| a.question_id == question_id)
        .filter_map(|a| a.id)
        .collect();

    let player_answer_ids = player_answers
        .iter()
        .filter(|p| p.question_id == question_id || answer_ids.contains(&p.answer_id))
        .filter_map(|p| p.id)
        .collect();

    CascadePlan {
        question_ids: Vec::new(),
        answer_ids,
        player_answer_ids,
    }
}

/// Plan the cascade for deleting the answer with the given id
pub fn for_answer(answer_id: i64, player_answers: &[PlayerAnswer]) -> CascadePlan {
    CascadePlan {
        question_ids: Vec::new(),
        answer_ids: Vec::new(),
        player_answer_ids: player_answers
            .iter()
            .filter(|p| p.answer_id == answer_id)
            .filter_map(|p| p.id)
            .collect(),
    }
}
