//! Row mappers, one per entity kind.
//!
//! Each repository owns every statement that touches its table: the bulk
//! `SELECT`, parameterized insert/update, and its delete. The functions take
//! `&mut SqliteConnection` so [`SqliteBackend`] can compose several of them
//! inside one transaction (question save replaces the full answer set).
//!
//! [`SqliteBackend`]: super::SqliteBackend

pub mod answer_repository;
pub mod player_answer_repository;
pub mod question_repository;
pub mod theme_repository;

pub use answer_repository::AnswerRepository;
pub use player_answer_repository::PlayerAnswerRepository;
pub use question_repository::QuestionRepository;
pub use theme_repository::ThemeRepository;
