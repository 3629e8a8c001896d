//! Career domain: the resume builder's profile.

use chrono::Utc;
use skillpath_store::{LocalStore, StoreResult};
use skillpath_sync::Outbox;
use skillpath_types::{EntityKind, MutationAction, MutationPayload, ResumeProfile};

/// Owns the career-tools slice of the data model. The device keeps a
/// single resume profile.
pub struct CareerService {
    store: LocalStore,
}

impl CareerService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Saves the resume profile. Upserts: creates it on first save,
    /// replaces fields afterwards.
    pub fn save_resume(
        &self,
        full_name: impl Into<String>,
        headline: impl Into<String>,
        summary: impl Into<String>,
        skills: Vec<String>,
    ) -> StoreResult<ResumeProfile> {
        let collection = EntityKind::ResumeProfile.collection();
        let existing = self.store.find_one(collection, |_| true)?;

        match existing {
            None => {
                let mut profile = ResumeProfile::new(full_name, headline);
                profile.summary = summary.into();
                profile.skills = skills;
                let value = serde_json::to_value(&profile)?;
                self.store.transaction(|tx| {
                    tx.insert(collection, &profile.id.to_string(), &value)?;
                    Outbox::enqueue_in(
                        tx,
                        MutationAction::Create,
                        MutationPayload::ResumeProfile(profile.clone()),
                    )?;
                    Ok(())
                })?;
                Ok(profile)
            }
            Some(row) => {
                let mut profile: ResumeProfile = serde_json::from_value(row.data)?;
                profile.full_name = full_name.into();
                profile.headline = headline.into();
                profile.summary = summary.into();
                profile.skills = skills;
                profile.updated_at = Utc::now();
                let key = profile.id.to_string();
                let value = serde_json::to_value(&profile)?;
                self.store.transaction(|tx| {
                    tx.update_by_id(collection, &key, &value)?;
                    Outbox::enqueue_in(
                        tx,
                        MutationAction::Update,
                        MutationPayload::ResumeProfile(profile.clone()),
                    )?;
                    Ok(())
                })?;
                Ok(profile)
            }
        }
    }

    /// The saved resume profile, if any.
    pub fn resume(&self) -> StoreResult<Option<ResumeProfile>> {
        let row = self
            .store
            .find_one(EntityKind::ResumeProfile.collection(), |_| true)?;
        match row {
            Some(row) => Ok(Some(serde_json::from_value(row.data)?)),
            None => Ok(None),
        }
    }
}
