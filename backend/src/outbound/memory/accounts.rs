//! Accounts, settings and identity records.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountFlags, AccountRepository, AccountRepositoryError, AdminSettingsRepository,
    AdminSettingsRepositoryError, IdentityDirectory, IdentityError, IdentityResolver,
};
use crate::domain::{Account, Permission, Role, TokenDigest, UserId};

use super::{MemoryStore, lock};

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(lock(&self.accounts).get(user_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut accounts: Vec<Account> = lock(&self.accounts).values().cloned().collect();
        accounts.sort_by(|a, b| {
            a.profile
                .display_name
                .as_ref()
                .cmp(b.profile.display_name.as_ref())
        });
        Ok(accounts)
    }

    async fn display_names(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, String>, AccountRepositoryError> {
        let accounts = lock(&self.accounts);
        Ok(user_ids
            .iter()
            .filter_map(|id| {
                accounts
                    .get(id)
                    .map(|account| (*id, account.profile.display_name.as_ref().to_owned()))
            })
            .collect())
    }

    async fn set_role(&self, user_id: &UserId, role: Role) -> Result<(), AccountRepositoryError> {
        if let Some(account) = lock(&self.accounts).get_mut(user_id) {
            account.role = role;
        }
        Ok(())
    }

    async fn update_flags(
        &self,
        user_id: &UserId,
        flags: AccountFlags,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut accounts = lock(&self.accounts);
        let Some(account) = accounts.get_mut(user_id) else {
            return Ok(None);
        };
        if let Some(active) = flags.active {
            account.profile.active = active;
        }
        if let Some(approved) = flags.approved {
            account.profile.approved = approved;
        }
        Ok(Some(account.clone()))
    }

    async fn set_permissions(
        &self,
        user_id: &UserId,
        permissions: &BTreeSet<Permission>,
    ) -> Result<(), AccountRepositoryError> {
        if let Some(account) = lock(&self.accounts).get_mut(user_id) {
            account.permissions.clone_from(permissions);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, AccountRepositoryError> {
        Ok(lock(&self.accounts).remove(user_id).is_some())
    }
}

#[async_trait]
impl AdminSettingsRepository for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AdminSettingsRepositoryError> {
        Ok(lock(&self.settings).get(key).cloned())
    }
}

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn resolve(
        &self,
        digest: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, IdentityError> {
        Ok(lock(&self.tokens)
            .get(digest)
            .filter(|token| token.expires_at.is_none_or(|expires| expires > now))
            .map(|token| token.user_id))
    }
}

#[async_trait]
impl IdentityDirectory for MemoryStore {
    async fn delete_identity(&self, user_id: &UserId) -> Result<(), IdentityError> {
        lock(&self.tokens).retain(|_, token| token.user_id != *user_id);
        Ok(())
    }
}
