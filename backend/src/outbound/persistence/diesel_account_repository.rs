//! PostgreSQL-backed `AccountRepository`.
//!
//! Accounts are assembled from `profiles`, `user_roles` and
//! `user_permissions`. A profile without a role row reads as `monteur`,
//! the role new staff start with.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{AccountFlags, AccountRepository, AccountRepositoryError};
use crate::domain::{Account, DisplayName, EmailAddress, Permission, Profile, Role, UserId};

use super::diesel_error_mapping::corrupt_row;
use super::models::{PermissionRow, ProfileRow};
use super::pool::DbPool;
use super::schema::{profiles, user_permissions, user_roles};

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = profiles)]
struct ProfileFlagsChangeset {
    active: Option<bool>,
    approved: Option<bool>,
}

fn assemble(
    row: ProfileRow,
    role: Option<String>,
    permissions: BTreeSet<Permission>,
) -> Result<Account, AccountRepositoryError> {
    let corrupt = |err: &dyn std::fmt::Display| {
        AccountRepositoryError::corrupt(corrupt_row("profiles", err))
    };
    let role = match role {
        Some(raw) => raw.parse::<Role>().map_err(|err| corrupt(&err))?,
        None => Role::Monteur,
    };
    Ok(Account {
        profile: Profile {
            user_id: UserId::from_uuid(row.user_id),
            display_name: DisplayName::new(row.display_name).map_err(|err| corrupt(&err))?,
            email: EmailAddress::new(row.email).map_err(|err| corrupt(&err))?,
            active: row.active,
            approved: row.approved,
        },
        role,
        permissions,
    })
}

fn group_permissions(
    rows: Vec<PermissionRow>,
) -> Result<HashMap<Uuid, BTreeSet<Permission>>, AccountRepositoryError> {
    let mut grouped: HashMap<Uuid, BTreeSet<Permission>> = HashMap::new();
    for row in rows {
        let permission = row.permission.parse::<Permission>().map_err(|err| {
            AccountRepositoryError::corrupt(corrupt_row("user_permissions", err))
        })?;
        grouped.entry(row.user_id).or_default().insert(permission);
    }
    Ok(grouped)
}

impl DieselAccountRepository {
    /// Load accounts for `ids`, or every account when `ids` is `None`.
    async fn load(
        conn: &mut AsyncPgConnection,
        ids: Option<&[Uuid]>,
    ) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut profile_query = profiles::table
            .left_join(user_roles::table)
            .select((ProfileRow::as_select(), user_roles::role.nullable()))
            .order(profiles::display_name)
            .into_boxed();
        let mut permission_query = user_permissions::table
            .select((user_permissions::user_id, user_permissions::permission))
            .into_boxed();
        if let Some(ids) = ids {
            profile_query = profile_query.filter(profiles::user_id.eq_any(ids));
            permission_query = permission_query.filter(user_permissions::user_id.eq_any(ids));
        }

        let rows: Vec<(ProfileRow, Option<String>)> =
            profile_query.load(conn).await.map_err(AccountRepositoryError::from)?;
        let permission_rows: Vec<PermissionRow> =
            permission_query.load(conn).await.map_err(AccountRepositoryError::from)?;
        let mut permissions = group_permissions(permission_rows)?;

        rows.into_iter()
            .map(|(row, role)| {
                let granted = permissions.remove(&row.user_id).unwrap_or_default();
                assemble(row, role, granted)
            })
            .collect()
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        let ids = [*user_id.as_uuid()];
        Ok(Self::load(&mut conn, Some(ids.as_slice())).await?.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        Self::load(&mut conn, None).await
    }

    async fn display_names(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, String>, AccountRepositoryError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        let ids: Vec<Uuid> = user_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid, String)> = profiles::table
            .filter(profiles::user_id.eq_any(&ids))
            .select((profiles::user_id, profiles::display_name))
            .load(&mut conn)
            .await
            .map_err(AccountRepositoryError::from)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| (UserId::from_uuid(id), name))
            .collect())
    }

    async fn set_role(&self, user_id: &UserId, role: Role) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        diesel::insert_into(user_roles::table)
            .values((
                user_roles::user_id.eq(user_id.as_uuid()),
                user_roles::role.eq(role.as_str()),
            ))
            .on_conflict(user_roles::user_id)
            .do_update()
            .set(user_roles::role.eq(role.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(AccountRepositoryError::from)
    }

    async fn update_flags(
        &self,
        user_id: &UserId,
        flags: AccountFlags,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        if flags.active.is_some() || flags.approved.is_some() {
            let updated = diesel::update(profiles::table.find(user_id.as_uuid()))
                .set(&ProfileFlagsChangeset {
                    active: flags.active,
                    approved: flags.approved,
                })
                .execute(&mut conn)
                .await
                .map_err(AccountRepositoryError::from)?;
            if updated == 0 {
                return Ok(None);
            }
        }
        let ids = [*user_id.as_uuid()];
        Ok(Self::load(&mut conn, Some(ids.as_slice())).await?.into_iter().next())
    }

    async fn set_permissions(
        &self,
        user_id: &UserId,
        permissions: &BTreeSet<Permission>,
    ) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        let id = *user_id.as_uuid();
        let rows: Vec<_> = permissions
            .iter()
            .map(|permission| {
                (
                    user_permissions::user_id.eq(id),
                    user_permissions::permission.eq(permission.as_str()),
                )
            })
            .collect();
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::delete(user_permissions::table.filter(user_permissions::user_id.eq(id)))
                    .execute(conn)
                    .await?;
                if !rows.is_empty() {
                    diesel::insert_into(user_permissions::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(AccountRepositoryError::from)
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AccountRepositoryError::from)?;
        let removed = diesel::delete(profiles::table.find(user_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(AccountRepositoryError::from)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row() -> ProfileRow {
        ProfileRow {
            user_id: Uuid::new_v4(),
            display_name: "Joost".to_owned(),
            email: "joost@werkplaats.nl".to_owned(),
            active: true,
            approved: false,
        }
    }

    #[rstest]
    #[case(None, Role::Monteur)]
    #[case(Some("foh"), Role::Foh)]
    fn missing_role_reads_as_monteur(#[case] stored: Option<&str>, #[case] expected: Role) {
        let account = assemble(row(), stored.map(str::to_owned), BTreeSet::new()).expect("account");
        assert_eq!(account.role, expected);
    }

    #[test]
    fn unknown_permission_is_reported_as_corrupt() {
        let result = group_permissions(vec![PermissionRow {
            user_id: Uuid::new_v4(),
            permission: "superpowers".to_owned(),
        }]);
        assert!(matches!(result, Err(AccountRepositoryError::Corrupt { .. })));
    }
}
