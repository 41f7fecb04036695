//! PostgreSQL-backed `AdminSettingsRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AdminSettingsRepository, AdminSettingsRepositoryError};

use super::pool::DbPool;
use super::schema::admin_settings;

#[derive(Clone)]
pub struct DieselAdminSettingsRepository {
    pool: DbPool,
}

impl DieselAdminSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminSettingsRepository for DieselAdminSettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, AdminSettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AdminSettingsRepositoryError::from)?;
        admin_settings::table
            .find(key)
            .select(admin_settings::value)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(AdminSettingsRepositoryError::from)
    }
}
