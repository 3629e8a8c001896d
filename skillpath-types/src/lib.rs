//! Core type definitions for Skillpath.
//!
//! This crate defines the shared types used throughout the offline-first
//! core:
//! - Record and outbox-entry identifiers (UUID v7)
//! - Domain records for the learning platform (courses, lessons, quizzes,
//!   timetable, community, career)
//! - The tagged mutation payload exchanged with the remote API
//! - Outbox entry types and offline content references
//!
//! Screen/view models and anything rendering-related belong in the host
//! application, not here.

mod content;
mod ids;
mod mutation;
mod records;

pub use content::{ContentType, OfflineContentRef};
pub use ids::{EntryId, RecordId};
pub use mutation::{MutationAction, MutationPayload, OutboxEntry, OutboxStatus};
pub use records::{
    Course, EntityKind, ForumPost, ForumThread, Lesson, LessonProgress, Quiz, QuizAttempt,
    QuizQuestion, ResumeProfile, TimetableSlot,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),
}
