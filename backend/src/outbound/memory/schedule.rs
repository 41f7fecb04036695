//! Availability slots and TV announcements.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    AnnouncementRepository, AnnouncementRepositoryError, AvailabilityRepository,
    AvailabilityRepositoryError,
};
use crate::domain::{Availability, AvailabilityQuery, AvailabilityStatus, TvAnnouncement};

use super::{MemoryStore, lock};

#[async_trait]
impl AvailabilityRepository for MemoryStore {
    async fn insert(&self, slot: &Availability) -> Result<(), AvailabilityRepositoryError> {
        let mut slots = lock(&self.availability);
        if slots
            .values()
            .any(|other| other.user_id == slot.user_id && other.date == slot.date)
        {
            return Err(AvailabilityRepositoryError::date_taken(slot.date.to_string()));
        }
        slots.insert(slot.id, slot.clone());
        Ok(())
    }

    async fn list(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Availability>, AvailabilityRepositoryError> {
        let mut slots: Vec<Availability> = lock(&self.availability)
            .values()
            .filter(|slot| query.matches(slot))
            .cloned()
            .collect();
        slots.sort_by_key(|slot| (slot.date, slot.start_time));
        Ok(slots)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AvailabilityStatus,
    ) -> Result<Option<Availability>, AvailabilityRepositoryError> {
        Ok(lock(&self.availability).get_mut(&id).map(|slot| {
            slot.status = status;
            slot.clone()
        }))
    }
}

#[async_trait]
impl AnnouncementRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<TvAnnouncement>, AnnouncementRepositoryError> {
        let mut announcements: Vec<TvAnnouncement> =
            lock(&self.announcements).values().cloned().collect();
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(announcements)
    }

    async fn insert(
        &self,
        announcement: &TvAnnouncement,
    ) -> Result<(), AnnouncementRepositoryError> {
        lock(&self.announcements).insert(announcement.id, announcement.clone());
        Ok(())
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<TvAnnouncement>, AnnouncementRepositoryError> {
        Ok(lock(&self.announcements).get_mut(&id).map(|announcement| {
            announcement.active = active;
            announcement.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AnnouncementRepositoryError> {
        Ok(lock(&self.announcements).remove(&id).is_some())
    }
}
