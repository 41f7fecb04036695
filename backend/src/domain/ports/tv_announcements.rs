//! Driving port for TV announcements.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AnnouncementDraft, Error, TvAnnouncement, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TvAnnouncements: Send + Sync {
    /// Announcements currently on screen; public.
    async fn visible(&self) -> Result<Vec<TvAnnouncement>, Error>;

    /// Every announcement, including inactive and expired ones.
    async fn list(&self, caller: &UserId) -> Result<Vec<TvAnnouncement>, Error>;

    async fn create(&self, caller: &UserId, draft: AnnouncementDraft)
    -> Result<TvAnnouncement, Error>;

    async fn set_active(&self, caller: &UserId, id: Uuid, active: bool)
    -> Result<TvAnnouncement, Error>;

    async fn delete(&self, caller: &UserId, id: Uuid) -> Result<(), Error>;
}
