//! Repair price list maintenance.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{AccountRepository, PriceList, RepairTypeRepository};
use crate::domain::service_support::{load_actor, map_repair_type_error};
use crate::domain::{Error, Permission, RepairType, RepairTypeDraft, RepairTypeId, UserId};

/// Service implementing [`PriceList`].
pub struct PriceListService<R, A> {
    repair_types: Arc<R>,
    accounts: Arc<A>,
}

impl<R, A> PriceListService<R, A> {
    pub fn new(repair_types: Arc<R>, accounts: Arc<A>) -> Self {
        Self {
            repair_types,
            accounts,
        }
    }
}

impl<R, A> PriceListService<R, A>
where
    R: RepairTypeRepository,
    A: AccountRepository,
{
    async fn editor(&self, caller: &UserId) -> Result<(), Error> {
        load_actor(self.accounts.as_ref(), caller)
            .await?
            .require_permission(Permission::Pricelist)
    }

    async fn existing(&self, id: &RepairTypeId) -> Result<RepairType, Error> {
        self.repair_types
            .find(id)
            .await
            .map_err(map_repair_type_error)?
            .ok_or_else(|| Error::not_found(format!("repair type {id} not found")))
    }
}

#[async_trait]
impl<R, A> PriceList for PriceListService<R, A>
where
    R: RepairTypeRepository,
    A: AccountRepository,
{
    async fn list(
        &self,
        caller: &UserId,
        include_inactive: bool,
    ) -> Result<Vec<RepairType>, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        self.repair_types
            .list(include_inactive)
            .await
            .map_err(map_repair_type_error)
    }

    async fn create(&self, caller: &UserId, draft: RepairTypeDraft) -> Result<RepairType, Error> {
        self.editor(caller).await?;
        let draft = draft.validate()?;
        let repair_type = RepairType {
            id: RepairTypeId::random(),
            name: draft.name,
            price_cents: draft.price_cents,
            points: draft.points,
            applicable_models: draft.applicable_models,
            active: true,
        };
        self.repair_types
            .insert(&repair_type)
            .await
            .map_err(map_repair_type_error)?;
        info!(repair_type = %repair_type.id, name = %repair_type.name, "repair type created");
        Ok(repair_type)
    }

    async fn update(
        &self,
        caller: &UserId,
        id: &RepairTypeId,
        draft: RepairTypeDraft,
    ) -> Result<RepairType, Error> {
        self.editor(caller).await?;
        let draft = draft.validate()?;
        let mut repair_type = self.existing(id).await?;
        repair_type.name = draft.name;
        repair_type.price_cents = draft.price_cents;
        repair_type.points = draft.points;
        repair_type.applicable_models = draft.applicable_models;
        self.repair_types
            .update(&repair_type)
            .await
            .map_err(map_repair_type_error)?;
        info!(repair_type = %id, "repair type updated");
        Ok(repair_type)
    }

    async fn set_active(
        &self,
        caller: &UserId,
        id: &RepairTypeId,
        active: bool,
    ) -> Result<RepairType, Error> {
        self.editor(caller).await?;
        let mut repair_type = self.existing(id).await?;
        if repair_type.active != active {
            repair_type.active = active;
            self.repair_types
                .update(&repair_type)
                .await
                .map_err(map_repair_type_error)?;
            info!(repair_type = %id, active, "repair type visibility changed");
        }
        Ok(repair_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAccountRepository, MockRepairTypeRepository};
    use crate::domain::{Account, BikeModel, ErrorCode, Role};
    use crate::test_support::staff_account;
    use rstest::rstest;

    fn accounts_for(actor: &Account) -> MockAccountRepository {
        let known = actor.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find()
            .returning(move |_| Ok(Some(known.clone())));
        accounts
    }

    fn draft() -> RepairTypeDraft {
        RepairTypeDraft {
            name: " Ketting vervangen ".to_owned(),
            price_cents: 2495,
            points: 3,
            applicable_models: vec![BikeModel::Racefiets, BikeModel::Stadsfiets, BikeModel::Racefiets],
        }
    }

    #[rstest]
    #[case(Role::Admin, &[], true)]
    #[case(Role::Foh, &[Permission::Pricelist], true)]
    #[case(Role::Monteur, &[], false)]
    #[tokio::test]
    async fn editing_requires_pricelist_permission(
        #[case] role: Role,
        #[case] permissions: &[Permission],
        #[case] allowed: bool,
    ) {
        let actor = staff_account(role, permissions);
        let mut repair_types = MockRepairTypeRepository::new();
        repair_types
            .expect_insert()
            .times(usize::from(allowed))
            .returning(|_| Ok(()));
        let service = PriceListService::new(Arc::new(repair_types), Arc::new(accounts_for(&actor)));

        let result = service.create(actor.user_id(), draft()).await;
        match result {
            Ok(created) => {
                assert!(allowed);
                assert_eq!(created.name, "Ketting vervangen");
                assert_eq!(created.applicable_models.len(), 2);
                assert!(created.active);
            }
            Err(error) => {
                assert!(!allowed);
                assert_eq!(error.code(), ErrorCode::Forbidden);
            }
        }
    }

    #[tokio::test]
    async fn deactivating_twice_writes_once() {
        let actor = staff_account(Role::Admin, &[]);
        let existing = RepairType {
            id: RepairTypeId::random(),
            name: "Remmen stellen".to_owned(),
            price_cents: 1000,
            points: 1,
            applicable_models: Vec::new(),
            active: false,
        };
        let id = existing.id;
        let mut repair_types = MockRepairTypeRepository::new();
        repair_types
            .expect_find()
            .returning(move |_| Ok(Some(existing.clone())));
        repair_types.expect_update().never();
        let service = PriceListService::new(Arc::new(repair_types), Arc::new(accounts_for(&actor)));

        let repair_type = service
            .set_active(actor.user_id(), &id, false)
            .await
            .expect("already inactive");
        assert!(!repair_type.active);
    }

    #[tokio::test]
    async fn any_staff_member_can_read_the_list() {
        let actor = staff_account(Role::Monteur, &[]);
        let mut repair_types = MockRepairTypeRepository::new();
        repair_types
            .expect_list()
            .withf(|include_inactive| !*include_inactive)
            .returning(|_| Ok(Vec::new()));
        let service = PriceListService::new(Arc::new(repair_types), Arc::new(accounts_for(&actor)));

        let list = service.list(actor.user_id(), false).await.expect("listed");
        assert!(list.is_empty());
    }
}
