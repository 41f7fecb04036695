//! Port for the price list.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{RepairType, RepairTypeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by price list adapters.
    pub enum RepairTypeRepositoryError {
        Connection { message: String } =>
            "repair type connection failed: {message}",
        Query { message: String } =>
            "repair type query failed: {message}",
        Corrupt { message: String } =>
            "repair type row is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepairTypeRepository: Send + Sync {
    /// Price list ordered by name.
    async fn list(&self, include_inactive: bool)
    -> Result<Vec<RepairType>, RepairTypeRepositoryError>;

    async fn find(&self, id: &RepairTypeId)
    -> Result<Option<RepairType>, RepairTypeRepositoryError>;

    /// Batch name lookup, including inactive entries.
    async fn names(
        &self,
        ids: &[RepairTypeId],
    ) -> Result<HashMap<RepairTypeId, String>, RepairTypeRepositoryError>;

    async fn insert(&self, repair_type: &RepairType) -> Result<(), RepairTypeRepositoryError>;

    async fn update(&self, repair_type: &RepairType) -> Result<(), RepairTypeRepositoryError>;
}
