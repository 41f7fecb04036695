//! PostgreSQL-backed TV announcements.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::TvAnnouncement;
use crate::domain::ports::{AnnouncementRepository, AnnouncementRepositoryError};

use super::models::AnnouncementRow;
use super::pool::DbPool;
use super::schema::tv_announcements;

#[derive(Clone)]
pub struct DieselAnnouncementRepository {
    pool: DbPool,
}

impl DieselAnnouncementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<AnnouncementRow> for TvAnnouncement {
    fn from(row: AnnouncementRow) -> Self {
        Self {
            id: row.id,
            message: row.message,
            background_color: row.background_color,
            text_color: row.text_color,
            icon: row.icon,
            fullscreen: row.fullscreen,
            active: row.active,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

impl From<&TvAnnouncement> for AnnouncementRow {
    fn from(announcement: &TvAnnouncement) -> Self {
        Self {
            id: announcement.id,
            message: announcement.message.clone(),
            background_color: announcement.background_color.clone(),
            text_color: announcement.text_color.clone(),
            icon: announcement.icon.clone(),
            fullscreen: announcement.fullscreen,
            active: announcement.active,
            expires_at: announcement.expires_at,
            created_at: announcement.created_at,
        }
    }
}

#[async_trait]
impl AnnouncementRepository for DieselAnnouncementRepository {
    async fn list(&self) -> Result<Vec<TvAnnouncement>, AnnouncementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AnnouncementRepositoryError::from)?;
        let rows: Vec<AnnouncementRow> = tv_announcements::table
            .select(AnnouncementRow::as_select())
            .order(tv_announcements::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(AnnouncementRepositoryError::from)?;
        Ok(rows.into_iter().map(TvAnnouncement::from).collect())
    }

    async fn insert(
        &self,
        announcement: &TvAnnouncement,
    ) -> Result<(), AnnouncementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AnnouncementRepositoryError::from)?;
        diesel::insert_into(tv_announcements::table)
            .values(AnnouncementRow::from(announcement))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(AnnouncementRepositoryError::from)
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> Result<Option<TvAnnouncement>, AnnouncementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AnnouncementRepositoryError::from)?;
        let row: Option<AnnouncementRow> = diesel::update(tv_announcements::table.find(id))
            .set(tv_announcements::active.eq(active))
            .returning(AnnouncementRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AnnouncementRepositoryError::from)?;
        Ok(row.map(TvAnnouncement::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AnnouncementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AnnouncementRepositoryError::from)?;
        let removed = diesel::delete(tv_announcements::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(AnnouncementRepositoryError::from)?;
        Ok(removed > 0)
    }
}
