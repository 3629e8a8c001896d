//! Community domain: forum threads and posts.

use skillpath_store::{LocalStore, OrderBy, StoreResult};
use skillpath_sync::Outbox;
use skillpath_types::{EntityKind, ForumPost, ForumThread, MutationAction, MutationPayload, RecordId};

/// Owns the community slice of the data model.
pub struct CommunityService {
    store: LocalStore,
}

impl CommunityService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Starts a new forum thread.
    pub fn create_thread(
        &self,
        title: impl Into<String>,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> StoreResult<ForumThread> {
        let thread = ForumThread::new(title, author, body);
        let value = serde_json::to_value(&thread)?;
        self.store.transaction(|tx| {
            tx.insert(
                EntityKind::ForumThread.collection(),
                &thread.id.to_string(),
                &value,
            )?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::ForumThread(thread.clone()),
            )?;
            Ok(())
        })?;
        Ok(thread)
    }

    /// Replies to a thread.
    pub fn add_post(
        &self,
        thread_id: RecordId,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> StoreResult<ForumPost> {
        let post = ForumPost::new(thread_id, author, body);
        let value = serde_json::to_value(&post)?;
        self.store.transaction(|tx| {
            tx.insert(
                EntityKind::ForumPost.collection(),
                &post.id.to_string(),
                &value,
            )?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::ForumPost(post.clone()),
            )?;
            Ok(())
        })?;
        Ok(post)
    }

    /// All threads, newest first.
    pub fn threads(&self) -> StoreResult<Vec<ForumThread>> {
        let rows = self.store.find_many(
            EntityKind::ForumThread.collection(),
            OrderBy::field_desc("created_at"),
        )?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }

    /// Posts of a thread in reply order.
    pub fn posts_for_thread(&self, thread_id: RecordId) -> StoreResult<Vec<ForumPost>> {
        let key = thread_id.to_string();
        let rows = self.store.find_where(
            EntityKind::ForumPost.collection(),
            |data| data["thread_id"] == key.as_str(),
            OrderBy::Insertion,
        )?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(Into::into))
            .collect()
    }
}
