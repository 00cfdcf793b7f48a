//! # Storage Module
//!
//! Handles all persistence for the quiz editor.
//!
//! This module abstracts away the specific storage implementation details and
//! provides a consistent interface for persisting and retrieving quiz
//! content. The implementation can be swapped (SQLite, per-entity files)
//! without affecting the domain logic or UI layers.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: Saving themes, questions, answers and recorded
//!   player answers
//! - **Data Retrieval**: Loading the full working set of each entity kind
//! - **Storage Abstraction**: One [`QuizStorage`] contract regardless of
//!   backend
//! - **Id Allocation**: Database-generated keys in the relational backend,
//!   watermark allocation in the file backend
//! - **Cascade Deletes**: Foreign-key constraints in the relational backend,
//!   an explicit [`cascade`] plan executed step by step in the file backend
//!
//! ## Error Handling
//!
//! No operation panics or lets a raw backend error escape: every failure is
//! reported as a [`StorageError`] result value.

pub mod cascade;
pub mod error;
pub mod fs;
pub mod sqlite;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use traits::QuizStorage;
