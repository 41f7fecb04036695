//! Port for repair line items.

use async_trait::async_trait;

use crate::domain::{BikeId, WorkRegistration, WorkRegistrationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by work registration adapters.
    pub enum WorkRegistrationRepositoryError {
        Connection { message: String } =>
            "work registration connection failed: {message}",
        Query { message: String } =>
            "work registration query failed: {message}",
        Corrupt { message: String } =>
            "work registration row is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkRegistrationRepository: Send + Sync {
    async fn insert(
        &self,
        registration: &WorkRegistration,
    ) -> Result<(), WorkRegistrationRepositoryError>;

    async fn update(
        &self,
        registration: &WorkRegistration,
    ) -> Result<(), WorkRegistrationRepositoryError>;

    async fn find(
        &self,
        id: &WorkRegistrationId,
    ) -> Result<Option<WorkRegistration>, WorkRegistrationRepositoryError>;

    /// Registrations of all `bikes` in one batch, oldest first.
    async fn for_bikes(
        &self,
        bikes: &[BikeId],
    ) -> Result<Vec<WorkRegistration>, WorkRegistrationRepositoryError>;
}
