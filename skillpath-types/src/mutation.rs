//! Mutation types for the sync queue.
//!
//! A mutation records one local change that must eventually reach the remote
//! system. Each outbox entry is immutable in intent: the sync driver only
//! ever flips its status and failure counters, never its payload.

use crate::records::{
    Course, EntityKind, ForumPost, ForumThread, Lesson, LessonProgress, Quiz, QuizAttempt,
    ResumeProfile, TimetableSlot,
};
use crate::{EntryId, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of change an outbox entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationAction::Create => f.write_str("create"),
            MutationAction::Update => f.write_str("update"),
            MutationAction::Delete => f.write_str("delete"),
        }
    }
}

/// The payload of a mutation: the full record at the time of the change.
///
/// One variant per synced entity kind, so the sync driver can dispatch on
/// the type without runtime inspection of untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "record", rename_all = "snake_case")]
pub enum MutationPayload {
    Course(Course),
    Lesson(Lesson),
    Quiz(Quiz),
    TimetableSlot(TimetableSlot),
    LessonProgress(LessonProgress),
    QuizAttempt(QuizAttempt),
    ForumThread(ForumThread),
    ForumPost(ForumPost),
    ResumeProfile(ResumeProfile),
}

impl MutationPayload {
    /// The entity kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            MutationPayload::Course(_) => EntityKind::Course,
            MutationPayload::Lesson(_) => EntityKind::Lesson,
            MutationPayload::Quiz(_) => EntityKind::Quiz,
            MutationPayload::TimetableSlot(_) => EntityKind::TimetableSlot,
            MutationPayload::LessonProgress(_) => EntityKind::LessonProgress,
            MutationPayload::QuizAttempt(_) => EntityKind::QuizAttempt,
            MutationPayload::ForumThread(_) => EntityKind::ForumThread,
            MutationPayload::ForumPost(_) => EntityKind::ForumPost,
            MutationPayload::ResumeProfile(_) => EntityKind::ResumeProfile,
        }
    }

    /// The id of the record inside the payload.
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        match self {
            MutationPayload::Course(r) => r.id,
            MutationPayload::Lesson(r) => r.id,
            MutationPayload::Quiz(r) => r.id,
            MutationPayload::TimetableSlot(r) => r.id,
            MutationPayload::LessonProgress(r) => r.id,
            MutationPayload::QuizAttempt(r) => r.id,
            MutationPayload::ForumThread(r) => r.id,
            MutationPayload::ForumPost(r) => r.id,
            MutationPayload::ResumeProfile(r) => r.id,
        }
    }

    /// The record's `updated_at` timestamp, used for last-writer-wins merges.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        match self {
            MutationPayload::Course(r) => r.updated_at,
            MutationPayload::Lesson(r) => r.updated_at,
            MutationPayload::Quiz(r) => r.updated_at,
            MutationPayload::TimetableSlot(r) => r.updated_at,
            MutationPayload::LessonProgress(r) => r.updated_at,
            MutationPayload::QuizAttempt(r) => r.updated_at,
            MutationPayload::ForumThread(r) => r.updated_at,
            MutationPayload::ForumPost(r) => r.updated_at,
            MutationPayload::ResumeProfile(r) => r.updated_at,
        }
    }

    /// Serializes only the inner record (without the payload tag).
    pub fn record_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            MutationPayload::Course(r) => serde_json::to_value(r),
            MutationPayload::Lesson(r) => serde_json::to_value(r),
            MutationPayload::Quiz(r) => serde_json::to_value(r),
            MutationPayload::TimetableSlot(r) => serde_json::to_value(r),
            MutationPayload::LessonProgress(r) => serde_json::to_value(r),
            MutationPayload::QuizAttempt(r) => serde_json::to_value(r),
            MutationPayload::ForumThread(r) => serde_json::to_value(r),
            MutationPayload::ForumPost(r) => serde_json::to_value(r),
            MutationPayload::ResumeProfile(r) => serde_json::to_value(r),
        }
    }

    /// Builds a payload from a bare record value of a known kind.
    ///
    /// This is the inverse of [`MutationPayload::record_value`] and is how
    /// bulk-pulled remote records are typed on the way in.
    pub fn from_kind_value(
        kind: EntityKind,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EntityKind::Course => MutationPayload::Course(serde_json::from_value(value)?),
            EntityKind::Lesson => MutationPayload::Lesson(serde_json::from_value(value)?),
            EntityKind::Quiz => MutationPayload::Quiz(serde_json::from_value(value)?),
            EntityKind::TimetableSlot => {
                MutationPayload::TimetableSlot(serde_json::from_value(value)?)
            }
            EntityKind::LessonProgress => {
                MutationPayload::LessonProgress(serde_json::from_value(value)?)
            }
            EntityKind::QuizAttempt => MutationPayload::QuizAttempt(serde_json::from_value(value)?),
            EntityKind::ForumThread => MutationPayload::ForumThread(serde_json::from_value(value)?),
            EntityKind::ForumPost => MutationPayload::ForumPost(serde_json::from_value(value)?),
            EntityKind::ResumeProfile => {
                MutationPayload::ResumeProfile(serde_json::from_value(value)?)
            }
        })
    }
}

/// Delivery status of an outbox entry.
///
/// `Synced` and `Abandoned` are terminal; entries in either state are never
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    /// Awaiting delivery to the remote API.
    Pending,
    /// Delivered; never re-sent.
    Synced,
    /// Exceeded the configured retry budget; surfaced but not retried.
    Abandoned,
}

/// A pending local mutation recorded in the `sync_status` collection.
///
/// Created by a domain service in the same store transaction as its local
/// write; mutated only by the sync driver. This schema must stay stable
/// across app versions so in-flight entries survive an upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    /// Unique identifier for this entry.
    pub id: EntryId,

    /// The entity kind the mutation targets.
    pub entity_kind: EntityKind,

    /// The id of the mutated record.
    pub entity_id: RecordId,

    /// The kind of change.
    pub action: MutationAction,

    /// Full record at the time of the change.
    pub payload: MutationPayload,

    /// Delivery status.
    pub status: OutboxStatus,

    /// Number of failed delivery attempts so far. Monotonically
    /// non-decreasing until the entry reaches a terminal status.
    pub sync_attempts: u32,

    /// When the driver last attempted (and failed) to deliver this entry.
    pub last_sync_attempt: Option<DateTime<Utc>>,

    /// When the entry was enqueued. Drives FIFO drain order.
    pub created_at: DateTime<Utc>,
}

impl OutboxEntry {
    /// Creates a pending entry for the given mutation.
    #[must_use]
    pub fn new(action: MutationAction, payload: MutationPayload) -> Self {
        Self {
            id: EntryId::new(),
            entity_kind: payload.kind(),
            entity_id: payload.record_id(),
            action,
            payload,
            status: OutboxStatus::Pending,
            sync_attempts: 0,
            last_sync_attempt: None,
            created_at: Utc::now(),
        }
    }

    /// Whether this entry has been delivered.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self.status, OutboxStatus::Synced)
    }

    /// Whether this entry still awaits delivery.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, OutboxStatus::Pending)
    }
}
