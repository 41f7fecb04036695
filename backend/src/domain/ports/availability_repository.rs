//! Port for mechanic availability slots.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Availability, AvailabilityQuery, AvailabilityStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by availability adapters.
    pub enum AvailabilityRepositoryError {
        Connection { message: String } =>
            "availability connection failed: {message}",
        Query { message: String } =>
            "availability query failed: {message}",
        /// The user already has a slot on that date.
        DateTaken { date: String } =>
            "a slot already exists on {date}",
        Corrupt { message: String } =>
            "availability row is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Store a new slot, enforcing one slot per user per date.
    async fn insert(&self, slot: &Availability) -> Result<(), AvailabilityRepositoryError>;

    /// Slots matching `query` ordered by date then start time.
    async fn list(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Availability>, AvailabilityRepositoryError>;

    /// Set the decision on a slot, returning it when it exists.
    async fn set_status(
        &self,
        id: Uuid,
        status: AvailabilityStatus,
    ) -> Result<Option<Availability>, AvailabilityRepositoryError>;
}
