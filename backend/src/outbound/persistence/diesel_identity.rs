//! Token lookups and identity removal over `access_tokens`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IdentityDirectory, IdentityError, IdentityResolver};
use crate::domain::{TokenDigest, UserId};

use super::models::AccessTokenRow;
use super::pool::DbPool;
use super::schema::access_tokens;

/// Resolves bearer token digests and revokes every token of a deleted user.
#[derive(Clone)]
pub struct DieselIdentityStore {
    pool: DbPool,
}

impl DieselIdentityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityResolver for DieselIdentityStore {
    async fn resolve(
        &self,
        digest: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, IdentityError> {
        let mut conn = self.pool.get().await.map_err(IdentityError::from)?;
        let row: Option<AccessTokenRow> = access_tokens::table
            .find(digest.as_str())
            .select(AccessTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(IdentityError::from)?;

        Ok(row
            .filter(|token| token.expires_at.is_none_or(|expires_at| expires_at > now))
            .map(|token| UserId::from_uuid(token.user_id)))
    }
}

#[async_trait]
impl IdentityDirectory for DieselIdentityStore {
    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let mut conn = self.pool.get().await.map_err(IdentityError::from)?;
        diesel::delete(access_tokens::table.filter(access_tokens::user_id.eq(user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(IdentityError::from)
    }
}
