//! Learning domain: courses, lessons, progress, quizzes.

use chrono::Utc;
use skillpath_store::{LocalStore, OrderBy, StoreError, StoreResult};
use skillpath_sync::Outbox;
use skillpath_types::{
    Course, EntityKind, Lesson, LessonProgress, MutationAction, MutationPayload, Quiz,
    QuizAttempt, QuizQuestion, RecordId,
};

/// Owns the learning slice of the data model.
///
/// Every mutating method performs its row write and the outbox enqueue in
/// one store transaction.
pub struct LearningService {
    store: LocalStore,
}

impl LearningService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    // ── Courses ──────────────────────────────────────────────────

    /// Creates a course locally and enqueues it for sync.
    pub fn create_course(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> StoreResult<Course> {
        let course = Course::new(title, description, category);
        let value = serde_json::to_value(&course)?;
        self.store.transaction(|tx| {
            tx.insert(
                EntityKind::Course.collection(),
                &course.id.to_string(),
                &value,
            )?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::Course(course.clone()),
            )?;
            Ok(())
        })?;
        Ok(course)
    }

    /// Updates a course's title and/or description.
    pub fn update_course(
        &self,
        id: RecordId,
        title: Option<String>,
        description: Option<String>,
    ) -> StoreResult<Course> {
        let collection = EntityKind::Course.collection();
        let key = id.to_string();
        self.store.transaction(|tx| {
            let row = tx
                .find_by_id(collection, &key)?
                .ok_or_else(|| StoreError::NotFound(format!("course {id}")))?;
            let mut course: Course = serde_json::from_value(row.data)?;
            if let Some(title) = title {
                course.title = title;
            }
            if let Some(description) = description {
                course.description = description;
            }
            course.updated_at = Utc::now();
            tx.update_by_id(collection, &key, &serde_json::to_value(&course)?)?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Update,
                MutationPayload::Course(course.clone()),
            )?;
            Ok(course)
        })
    }

    /// Deletes a course locally and enqueues the deletion.
    pub fn delete_course(&self, id: RecordId) -> StoreResult<()> {
        let collection = EntityKind::Course.collection();
        let key = id.to_string();
        self.store.transaction(|tx| {
            let Some(row) = tx.find_by_id(collection, &key)? else {
                return Ok(());
            };
            let course: Course = serde_json::from_value(row.data)?;
            tx.delete_by_id(collection, &key)?;
            Outbox::enqueue_in(tx, MutationAction::Delete, MutationPayload::Course(course))?;
            Ok(())
        })
    }

    /// All courses in insertion order.
    pub fn courses(&self) -> StoreResult<Vec<Course>> {
        let rows = self
            .store
            .find_many(EntityKind::Course.collection(), OrderBy::Insertion)?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }

    /// Looks up a course by id.
    pub fn course(&self, id: RecordId) -> StoreResult<Option<Course>> {
        let row = self
            .store
            .find_by_id(EntityKind::Course.collection(), &id.to_string())?;
        match row {
            Some(row) => Ok(Some(serde_json::from_value(row.data)?)),
            None => Ok(None),
        }
    }

    // ── Lessons ──────────────────────────────────────────────────

    /// Adds a lesson to a course.
    pub fn add_lesson(
        &self,
        course_id: RecordId,
        title: impl Into<String>,
        body: impl Into<String>,
        position: u32,
        duration_minutes: u32,
    ) -> StoreResult<Lesson> {
        let lesson = Lesson::new(course_id, title, body, position, duration_minutes);
        let value = serde_json::to_value(&lesson)?;
        self.store.transaction(|tx| {
            tx.insert(
                EntityKind::Lesson.collection(),
                &lesson.id.to_string(),
                &value,
            )?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::Lesson(lesson.clone()),
            )?;
            Ok(())
        })?;
        Ok(lesson)
    }

    /// Lessons of a course, ordered by position.
    pub fn lessons_for_course(&self, course_id: RecordId) -> StoreResult<Vec<Lesson>> {
        let key = course_id.to_string();
        let rows = self.store.find_where(
            EntityKind::Lesson.collection(),
            |data| data["course_id"] == key.as_str(),
            OrderBy::field("position"),
        )?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }

    // ── Progress ─────────────────────────────────────────────────

    /// Records progress for a lesson. Upserts: the first call creates the
    /// progress record, later calls update it.
    pub fn record_progress(
        &self,
        lesson_id: RecordId,
        completed: bool,
        progress_pct: u8,
    ) -> StoreResult<LessonProgress> {
        let collection = EntityKind::LessonProgress.collection();
        let lesson_key = lesson_id.to_string();
        let existing = self
            .store
            .find_one(collection, |data| data["lesson_id"] == lesson_key.as_str())?;

        match existing {
            None => {
                let progress = LessonProgress::new(lesson_id, completed, progress_pct);
                let value = serde_json::to_value(&progress)?;
                self.store.transaction(|tx| {
                    tx.insert(collection, &progress.id.to_string(), &value)?;
                    Outbox::enqueue_in(
                        tx,
                        MutationAction::Create,
                        MutationPayload::LessonProgress(progress.clone()),
                    )?;
                    Ok(())
                })?;
                Ok(progress)
            }
            Some(row) => {
                let mut progress: LessonProgress = serde_json::from_value(row.data)?;
                progress.completed = completed;
                progress.progress_pct = progress_pct;
                progress.updated_at = Utc::now();
                let key = progress.id.to_string();
                let value = serde_json::to_value(&progress)?;
                self.store.transaction(|tx| {
                    tx.update_by_id(collection, &key, &value)?;
                    Outbox::enqueue_in(
                        tx,
                        MutationAction::Update,
                        MutationPayload::LessonProgress(progress.clone()),
                    )?;
                    Ok(())
                })?;
                Ok(progress)
            }
        }
    }

    // ── Quizzes ──────────────────────────────────────────────────

    /// Creates a quiz for a course.
    pub fn create_quiz(
        &self,
        course_id: RecordId,
        title: impl Into<String>,
        questions: Vec<QuizQuestion>,
    ) -> StoreResult<Quiz> {
        let quiz = Quiz::new(course_id, title, questions);
        let value = serde_json::to_value(&quiz)?;
        self.store.transaction(|tx| {
            tx.insert(EntityKind::Quiz.collection(), &quiz.id.to_string(), &value)?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::Quiz(quiz.clone()),
            )?;
            Ok(())
        })?;
        Ok(quiz)
    }

    /// Records a finished quiz attempt.
    pub fn record_quiz_attempt(
        &self,
        quiz_id: RecordId,
        score: u32,
        total: u32,
    ) -> StoreResult<QuizAttempt> {
        let attempt = QuizAttempt::new(quiz_id, score, total);
        let value = serde_json::to_value(&attempt)?;
        self.store.transaction(|tx| {
            tx.insert(
                EntityKind::QuizAttempt.collection(),
                &attempt.id.to_string(),
                &value,
            )?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::QuizAttempt(attempt.clone()),
            )?;
            Ok(())
        })?;
        Ok(attempt)
    }

    /// Attempts for a quiz, most recent first.
    pub fn attempts_for_quiz(&self, quiz_id: RecordId) -> StoreResult<Vec<QuizAttempt>> {
        let key = quiz_id.to_string();
        let rows = self.store.find_where(
            EntityKind::QuizAttempt.collection(),
            |data| data["quiz_id"] == key.as_str(),
            OrderBy::field_desc("created_at"),
        )?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }
}
