//! # Domain Module
//!
//! The layer the editor panels and the statistics module talk to. It exposes
//! the repository facade [`QuizService`] and nothing backend-specific;
//! consumers never see connection types, file paths or SQL.

pub mod quiz_service;

pub use quiz_service::QuizService;
