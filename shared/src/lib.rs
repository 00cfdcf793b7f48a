use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quiz theme: a titled group of questions.
///
/// Themes own their questions; deleting a theme removes every question (and
/// transitively every answer and recorded player answer) underneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Storage-assigned identifier; `None` until the first save
    pub id: Option<i64>,
    /// Display title shown in the editor's theme list
    pub title: String,
    /// Free-text description of the theme
    pub text: String,
}

impl Theme {
    /// Create a new, not-yet-persisted theme
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            text: text.into(),
        }
    }

    /// True until the theme has been saved for the first time
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// A single quiz question belonging to a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Storage-assigned identifier; `None` until the first save
    pub id: Option<i64>,
    /// Short title shown in the question list
    pub title: String,
    /// Full question text presented to the player
    pub text: String,
    /// Id of the theme this question belongs to
    pub theme_id: i64,
}

impl Question {
    /// Create a new, not-yet-persisted question under the given theme
    pub fn new(title: impl Into<String>, text: impl Into<String>, theme_id: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            text: text.into(),
            theme_id,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// One answer option of a question.
///
/// The editor UI caps a question at four answers; the storage layer does not
/// enforce an upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Storage-assigned identifier; `None` until the first save
    pub id: Option<i64>,
    /// Answer text shown to the player
    pub text: String,
    /// Whether this option is the correct one
    pub is_correct: bool,
    /// Id of the question this answer belongs to
    pub question_id: i64,
}

impl Answer {
    /// Create a new, not-yet-persisted answer for the given question
    pub fn new(text: impl Into<String>, is_correct: bool, question_id: i64) -> Self {
        Self {
            id: None,
            text: text.into(),
            is_correct,
            question_id,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// One recorded response event from quiz play, used by the statistics module.
///
/// Immutable once created except through an explicit save of the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnswer {
    /// Storage-assigned identifier; `None` until the first save
    pub id: Option<i64>,
    /// Id of the question that was presented
    pub question_id: i64,
    /// Id of the answer option this record refers to
    pub answer_id: i64,
    /// Whether the player picked this option
    pub selected: bool,
    /// When the response was recorded (RFC 3339 in storage)
    pub created_at: DateTime<Utc>,
}

impl PlayerAnswer {
    /// Create a new, not-yet-persisted player answer stamped with the current time
    pub fn new(question_id: i64, answer_id: i64, selected: bool) -> Self {
        Self {
            id: None,
            question_id,
            answer_id,
            selected,
            created_at: Utc::now(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}
