//! Timetable domain: the user's recurring study schedule.

use skillpath_store::{LocalStore, OrderBy, StoreResult};
use skillpath_sync::Outbox;
use skillpath_types::{EntityKind, MutationAction, MutationPayload, RecordId, TimetableSlot};

/// Owns the timetable slice of the data model.
pub struct TimetableService {
    store: LocalStore,
}

impl TimetableService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Adds a slot to the timetable.
    pub fn add_slot(
        &self,
        title: impl Into<String>,
        day_of_week: u8,
        starts_at: u16,
        ends_at: u16,
    ) -> StoreResult<TimetableSlot> {
        let slot = TimetableSlot::new(title, day_of_week, starts_at, ends_at);
        let value = serde_json::to_value(&slot)?;
        self.store.transaction(|tx| {
            tx.insert(
                EntityKind::TimetableSlot.collection(),
                &slot.id.to_string(),
                &value,
            )?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Create,
                MutationPayload::TimetableSlot(slot.clone()),
            )?;
            Ok(())
        })?;
        Ok(slot)
    }

    /// Removes a slot. No-op if it does not exist.
    pub fn remove_slot(&self, id: RecordId) -> StoreResult<()> {
        let collection = EntityKind::TimetableSlot.collection();
        let key = id.to_string();
        self.store.transaction(|tx| {
            let Some(row) = tx.find_by_id(collection, &key)? else {
                return Ok(());
            };
            let slot: TimetableSlot = serde_json::from_value(row.data)?;
            tx.delete_by_id(collection, &key)?;
            Outbox::enqueue_in(
                tx,
                MutationAction::Delete,
                MutationPayload::TimetableSlot(slot),
            )?;
            Ok(())
        })
    }

    /// The full week, ordered by day then start time.
    pub fn week(&self) -> StoreResult<Vec<TimetableSlot>> {
        let rows = self
            .store
            .find_many(EntityKind::TimetableSlot.collection(), OrderBy::Insertion)?;
        let mut slots: Vec<TimetableSlot> = rows
            .into_iter()
            .map(|row| serde_json::from_value(row.data).map_err(skillpath_store::StoreError::from))
            .collect::<StoreResult<_>>()?;
        slots.sort_by_key(|s| (s.day_of_week, s.starts_at));
        Ok(slots)
    }
}
