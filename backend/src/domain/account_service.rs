//! Staff account administration.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountAdministration, AccountFlags, AccountRepository, IdentityDirectory,
};
use crate::domain::service_support::{load_actor, map_account_error, map_identity_error};
use crate::domain::{Account, Error, PASSWORD_HASH_COST, Permission, Role, UserId, hash_password};

/// Service implementing [`AccountAdministration`].
pub struct AccountService<A, I> {
    accounts: Arc<A>,
    identities: Arc<I>,
    super_admin: Option<UserId>,
    hash_cost: u32,
}

impl<A, I> AccountService<A, I> {
    pub fn new(accounts: Arc<A>, identities: Arc<I>, super_admin: Option<UserId>) -> Self {
        Self {
            accounts,
            identities,
            super_admin,
            hash_cost: PASSWORD_HASH_COST,
        }
    }

    /// Override the bcrypt work factor.
    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}

impl<A, I> AccountService<A, I>
where
    A: AccountRepository,
    I: IdentityDirectory,
{
    async fn admin(&self, caller: &UserId) -> Result<Account, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        actor.require_admin()?;
        Ok(actor)
    }

    /// The super admin cannot be deleted, demoted or disabled.
    fn guard_super_admin(&self, target: &UserId, action: &str) -> Result<(), Error> {
        if self.super_admin.as_ref() == Some(target) {
            warn!(%target, action, "refused change to the super admin account");
            return Err(Error::forbidden(format!("the super admin account cannot be {action}")));
        }
        Ok(())
    }

    async fn target(&self, target: &UserId) -> Result<Account, Error> {
        self.accounts
            .find(target)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found(format!("account {target} not found")))
    }
}

#[async_trait]
impl<A, I> AccountAdministration for AccountService<A, I>
where
    A: AccountRepository,
    I: IdentityDirectory,
{
    async fn me(&self, caller: &UserId) -> Result<Account, Error> {
        // Unapproved accounts may still see their own state.
        self.accounts
            .find(caller)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::forbidden("no workshop account for this user"))
    }

    async fn list(&self, caller: &UserId) -> Result<Vec<Account>, Error> {
        self.admin(caller).await?;
        self.accounts.list().await.map_err(map_account_error)
    }

    async fn update_flags(
        &self,
        caller: &UserId,
        target: &UserId,
        flags: AccountFlags,
    ) -> Result<Account, Error> {
        self.admin(caller).await?;
        if flags.active == Some(false) || flags.approved == Some(false) {
            self.guard_super_admin(target, "disabled")?;
        }
        let updated = self
            .accounts
            .update_flags(target, flags)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found(format!("account {target} not found")))?;
        info!(%caller, %target, active = ?flags.active, approved = ?flags.approved, "account flags updated");
        Ok(updated)
    }

    async fn set_role(
        &self,
        caller: &UserId,
        target: &UserId,
        role: Role,
    ) -> Result<Account, Error> {
        self.admin(caller).await?;
        if role == Role::Admin {
            return Err(Error::forbidden(
                "the admin role is only granted through password verification",
            ));
        }
        self.guard_super_admin(target, "demoted")?;
        let mut account = self.target(target).await?;
        self.accounts
            .set_role(target, role)
            .await
            .map_err(map_account_error)?;
        info!(%caller, %target, role = role.as_str(), "account role changed");
        account.role = role;
        Ok(account)
    }

    async fn set_permissions(
        &self,
        caller: &UserId,
        target: &UserId,
        permissions: BTreeSet<Permission>,
    ) -> Result<Account, Error> {
        self.admin(caller).await?;
        let mut account = self.target(target).await?;
        self.accounts
            .set_permissions(target, &permissions)
            .await
            .map_err(map_account_error)?;
        info!(%caller, %target, count = permissions.len(), "account permissions replaced");
        account.permissions = permissions;
        Ok(account)
    }

    async fn delete_user(&self, caller: &UserId, target: &UserId) -> Result<(), Error> {
        self.admin(caller).await?;
        if caller == target {
            return Err(Error::forbidden("you cannot delete your own account"));
        }
        self.guard_super_admin(target, "deleted")?;
        let existed = self
            .accounts
            .delete(target)
            .await
            .map_err(map_account_error)?;
        self.identities
            .delete_identity(target)
            .await
            .map_err(map_identity_error)?;
        info!(%caller, %target, existed, "user deleted");
        Ok(())
    }

    async fn hash_password(&self, caller: &UserId, password: &str) -> Result<String, Error> {
        if self.super_admin.as_ref() != Some(caller) {
            return Err(Error::forbidden("only the super admin may hash passwords"));
        }
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty"));
        }
        let plain = Zeroizing::new(password.to_owned());
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || hash_password(plain.as_str(), cost))
            .await
            .map_err(|err| Error::internal(format!("hashing task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockAccountRepository, MockIdentityDirectory};
    use crate::test_support::staff_account;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn service(
        accounts: MockAccountRepository,
        identities: MockIdentityDirectory,
        super_admin: Option<UserId>,
    ) -> AccountService<MockAccountRepository, MockIdentityDirectory> {
        AccountService::new(Arc::new(accounts), Arc::new(identities), super_admin).with_hash_cost(4)
    }

    fn accounts_with(known: Vec<Account>) -> MockAccountRepository {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find().returning(move |id| {
            Ok(known
                .iter()
                .find(|account| account.user_id() == id)
                .cloned())
        });
        accounts
    }

    #[tokio::test]
    async fn admins_cannot_grant_admin_directly() {
        let admin = staff_account(Role::Admin, &[]);
        let target = staff_account(Role::Monteur, &[]);
        let (admin_id, target_id) = (*admin.user_id(), *target.user_id());
        let mut accounts = accounts_with(vec![admin, target]);
        accounts.expect_set_role().never();

        let error = service(accounts, MockIdentityDirectory::new(), None)
            .set_role(&admin_id, &target_id, Role::Admin)
            .await
            .expect_err("admin role refused");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn role_change_returns_updated_account() {
        let admin = staff_account(Role::Admin, &[]);
        let target = staff_account(Role::Monteur, &[]);
        let (admin_id, target_id) = (*admin.user_id(), *target.user_id());
        let mut accounts = accounts_with(vec![admin, target]);
        accounts
            .expect_set_role()
            .with(eq(target_id), eq(Role::Foh))
            .times(1)
            .returning(|_, _| Ok(()));

        let account = service(accounts, MockIdentityDirectory::new(), None)
            .set_role(&admin_id, &target_id, Role::Foh)
            .await
            .expect("role set");
        assert_eq!(account.role, Role::Foh);
    }

    #[tokio::test]
    async fn delete_removes_profile_and_identity() {
        let admin = staff_account(Role::Admin, &[]);
        let admin_id = *admin.user_id();
        let target_id = UserId::random();
        let mut accounts = accounts_with(vec![admin]);
        accounts
            .expect_delete()
            .with(eq(target_id))
            .times(1)
            .returning(|_| Ok(false));
        let mut identities = MockIdentityDirectory::new();
        identities
            .expect_delete_identity()
            .with(eq(target_id))
            .times(1)
            .returning(|_| Ok(()));

        service(accounts, identities, None)
            .delete_user(&admin_id, &target_id)
            .await
            .expect("unknown users delete idempotently");
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let admin = staff_account(Role::Admin, &[]);
        let admin_id = *admin.user_id();
        let mut accounts = accounts_with(vec![admin]);
        accounts.expect_delete().never();

        let error = service(accounts, MockIdentityDirectory::new(), None)
            .delete_user(&admin_id, &admin_id)
            .await
            .expect_err("self delete");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case::delete("delete")]
    #[case::demote("demote")]
    #[case::disable("disable")]
    #[tokio::test]
    async fn super_admin_account_is_protected(#[case] action: &str) {
        let admin = staff_account(Role::Admin, &[]);
        let owner = staff_account(Role::Admin, &[]);
        let (admin_id, owner_id) = (*admin.user_id(), *owner.user_id());
        let mut accounts = accounts_with(vec![admin, owner]);
        accounts.expect_delete().never();
        accounts.expect_set_role().never();
        accounts.expect_update_flags().never();
        let mut identities = MockIdentityDirectory::new();
        identities.expect_delete_identity().never();
        let service = service(accounts, identities, Some(owner_id));

        let result = match action {
            "delete" => service.delete_user(&admin_id, &owner_id).await,
            "demote" => service
                .set_role(&admin_id, &owner_id, Role::Monteur)
                .await
                .map(drop),
            _ => service
                .update_flags(
                    &admin_id,
                    &owner_id,
                    AccountFlags {
                        active: Some(false),
                        approved: None,
                    },
                )
                .await
                .map(drop),
        };
        assert_eq!(result.expect_err("protected").code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn listing_requires_admin() {
        let foh = staff_account(Role::Foh, &[Permission::CallStatus]);
        let foh_id = *foh.user_id();
        let error = service(accounts_with(vec![foh]), MockIdentityDirectory::new(), None)
            .list(&foh_id)
            .await
            .expect_err("not admin");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(true, "geheim", None)]
    #[case(false, "geheim", Some(ErrorCode::Forbidden))]
    #[case(true, "", Some(ErrorCode::InvalidRequest))]
    #[tokio::test]
    async fn hashing_is_reserved_for_the_super_admin(
        #[case] is_super_admin: bool,
        #[case] password: &str,
        #[case] expected: Option<ErrorCode>,
    ) {
        let caller = UserId::random();
        let super_admin = if is_super_admin {
            Some(caller)
        } else {
            Some(UserId::random())
        };
        let result = service(
            MockAccountRepository::new(),
            MockIdentityDirectory::new(),
            super_admin,
        )
        .hash_password(&caller, password)
        .await;
        match expected {
            None => {
                let hash = result.expect("hash produced");
                assert!(hash.starts_with("$2"));
                assert!(bcrypt::verify(password, &hash).expect("verify"));
            }
            Some(code) => assert_eq!(result.expect_err("rejected").code(), code),
        }
    }

    #[tokio::test]
    async fn missing_flags_target_is_not_found() {
        let admin = staff_account(Role::Admin, &[]);
        let admin_id = *admin.user_id();
        let mut accounts = accounts_with(vec![admin]);
        accounts.expect_update_flags().returning(|_, _| Ok(None));

        let error = service(accounts, MockIdentityDirectory::new(), None)
            .update_flags(
                &admin_id,
                &UserId::random(),
                AccountFlags {
                    active: Some(false),
                    approved: None,
                },
            )
            .await
            .expect_err("unknown target");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
