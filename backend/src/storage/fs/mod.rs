//! # File Storage Backend
//!
//! Per-entity file implementation of the [`QuizStorage`] contract. It
//! demonstrates that the domain layer is completely storage-agnostic by
//! providing an alternative to the SQLite implementation.
//!
//! ## Layout
//!
//! One directory per entity kind, one JSON file per instance named by its id:
//!
//! ```text
//! <data_dir>/themes/3.json
//! <data_dir>/questions/17.json
//! <data_dir>/answers/64.json
//! <data_dir>/player_answers/128.json
//! ```
//!
//! Each file is a serde_json snapshot of all entity fields including the id.
//! Writes go to a temp file first and are renamed into place, so a single
//! save is atomic per file (not across a cascade).
//!
//! ## Ids and cascades
//!
//! Without database-generated keys, ids come from a per-kind watermark
//! allocator ([`id_alloc::IdAllocator`]) seeded by a directory scan at open.
//! Cascading deletes are executed in application code from a
//! [`cascade::CascadePlan`], children first, so a partially completed cascade
//! can simply be retried.
//!
//! [`QuizStorage`]: crate::storage::QuizStorage
//! [`cascade::CascadePlan`]: crate::storage::cascade::CascadePlan

pub mod backend;
pub mod connection;
pub mod id_alloc;

pub mod answer_repository;
pub mod player_answer_repository;
pub mod question_repository;
pub mod theme_repository;

#[cfg(test)]
pub mod test_utils;

pub use backend::FileBackend;
pub use connection::FileConnection;
pub use id_alloc::IdAllocator;
