//! Driving port for the repair price list.

use async_trait::async_trait;

use crate::domain::{Error, RepairType, RepairTypeDraft, RepairTypeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceList: Send + Sync {
    async fn list(&self, caller: &UserId, include_inactive: bool)
    -> Result<Vec<RepairType>, Error>;

    async fn create(&self, caller: &UserId, draft: RepairTypeDraft) -> Result<RepairType, Error>;

    async fn update(
        &self,
        caller: &UserId,
        id: &RepairTypeId,
        draft: RepairTypeDraft,
    ) -> Result<RepairType, Error>;

    /// Hide or restore an entry without deleting historic registrations.
    async fn set_active(
        &self,
        caller: &UserId,
        id: &RepairTypeId,
        active: bool,
    ) -> Result<RepairType, Error>;
}
