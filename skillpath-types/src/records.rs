//! Domain records for the learning platform.
//!
//! Each record owns a stable [`RecordId`] and `created_at`/`updated_at`
//! timestamps (serialized as RFC 3339 strings). The local store treats all
//! of these as untyped JSON rows; typing only exists at this layer and in
//! the mutation payload exchanged with the remote API.

use crate::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The entity types tracked by the sync subsystem.
///
/// Each kind maps to one local store collection and one logical remote
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    Lesson,
    Quiz,
    TimetableSlot,
    LessonProgress,
    QuizAttempt,
    ForumThread,
    ForumPost,
    ResumeProfile,
}

impl EntityKind {
    /// All synced entity kinds, in the order they are bulk-pulled.
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Course,
        EntityKind::Lesson,
        EntityKind::Quiz,
        EntityKind::TimetableSlot,
        EntityKind::LessonProgress,
        EntityKind::QuizAttempt,
        EntityKind::ForumThread,
        EntityKind::ForumPost,
        EntityKind::ResumeProfile,
    ];

    /// The local store collection this kind is persisted in.
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            EntityKind::Course => "courses",
            EntityKind::Lesson => "lessons",
            EntityKind::Quiz => "quizzes",
            EntityKind::TimetableSlot => "timetable",
            EntityKind::LessonProgress => "lesson_progress",
            EntityKind::QuizAttempt => "quiz_attempts",
            EntityKind::ForumThread => "forum_threads",
            EntityKind::ForumPost => "forum_posts",
            EntityKind::ResumeProfile => "resume_profiles",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "courses" => Ok(EntityKind::Course),
            "lessons" => Ok(EntityKind::Lesson),
            "quizzes" => Ok(EntityKind::Quiz),
            "timetable" => Ok(EntityKind::TimetableSlot),
            "lesson_progress" => Ok(EntityKind::LessonProgress),
            "quiz_attempts" => Ok(EntityKind::QuizAttempt),
            "forum_threads" => Ok(EntityKind::ForumThread),
            "forum_posts" => Ok(EntityKind::ForumPost),
            "resume_profiles" => Ok(EntityKind::ResumeProfile),
            other => Err(crate::Error::UnknownEntityKind(other.to_string())),
        }
    }
}

/// A course groups lessons and quizzes under one syllabus entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    /// Subject area, e.g. "mathematics" or "career-skills".
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new course stamped with the current time.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single lesson within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: RecordId,
    pub course_id: RecordId,
    pub title: String,
    /// Lesson body as markdown.
    pub body: String,
    /// Position within the course, starting at 0.
    pub position: u32,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Creates a new lesson stamped with the current time.
    #[must_use]
    pub fn new(
        course_id: RecordId,
        title: impl Into<String>,
        body: impl Into<String>,
        position: u32,
        duration_minutes: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            course_id,
            title: title.into(),
            body: body.into(),
            position,
            duration_minutes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One question of a quiz. Embedded in [`Quiz`], never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    /// Index into `choices`.
    pub answer_index: u32,
}

/// A quiz attached to a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: RecordId,
    pub course_id: RecordId,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    /// Creates a new quiz stamped with the current time.
    #[must_use]
    pub fn new(course_id: RecordId, title: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            course_id,
            title: title.into(),
            questions,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A recurring slot in the user's study timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: RecordId,
    pub title: String,
    /// 0 = Monday … 6 = Sunday.
    pub day_of_week: u8,
    /// Minutes since midnight, local time.
    pub starts_at: u16,
    /// Minutes since midnight, local time.
    pub ends_at: u16,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimetableSlot {
    /// Creates a new timetable slot stamped with the current time.
    #[must_use]
    pub fn new(title: impl Into<String>, day_of_week: u8, starts_at: u16, ends_at: u16) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            title: title.into(),
            day_of_week,
            starts_at,
            ends_at,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-lesson progress for the local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub id: RecordId,
    pub lesson_id: RecordId,
    pub completed: bool,
    /// 0–100.
    pub progress_pct: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    /// Creates a progress record stamped with the current time.
    #[must_use]
    pub fn new(lesson_id: RecordId, completed: bool, progress_pct: u8) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            lesson_id,
            completed,
            progress_pct,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A completed (or in-progress) quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: RecordId,
    pub quiz_id: RecordId,
    pub score: u32,
    pub total: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Creates an attempt record stamped with the current time.
    #[must_use]
    pub fn new(quiz_id: RecordId, score: u32, total: u32) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            quiz_id,
            score,
            total,
            completed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A community forum thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumThread {
    pub id: RecordId,
    pub title: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForumThread {
    /// Creates a new thread stamped with the current time.
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            title: title.into(),
            author: author.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reply within a forum thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: RecordId,
    pub thread_id: RecordId,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForumPost {
    /// Creates a new post stamped with the current time.
    #[must_use]
    pub fn new(thread_id: RecordId, author: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            thread_id,
            author: author.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The user's resume profile from the career-tools screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub id: RecordId,
    pub full_name: String,
    pub headline: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeProfile {
    /// Creates a new resume profile stamped with the current time.
    #[must_use]
    pub fn new(full_name: impl Into<String>, headline: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            full_name: full_name.into(),
            headline: headline.into(),
            summary: String::new(),
            skills: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
