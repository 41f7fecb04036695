//! Port for TV announcements.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::TvAnnouncement;

use super::define_port_error;

define_port_error! {
    /// Errors raised by announcement adapters.
    pub enum AnnouncementRepositoryError {
        Connection { message: String } =>
            "announcement connection failed: {message}",
        Query { message: String } =>
            "announcement query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Every announcement, newest first.
    async fn list(&self) -> Result<Vec<TvAnnouncement>, AnnouncementRepositoryError>;

    async fn insert(&self, announcement: &TvAnnouncement)
    -> Result<(), AnnouncementRepositoryError>;

    /// Toggle visibility, returning the announcement when it exists.
    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<TvAnnouncement>, AnnouncementRepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AnnouncementRepositoryError>;
}
