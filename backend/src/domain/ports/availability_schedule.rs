//! Driving port for mechanic availability.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Availability, AvailabilityDraft, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilitySchedule: Send + Sync {
    /// Register a pending slot for the caller.
    async fn submit(&self, caller: &UserId, draft: AvailabilityDraft)
    -> Result<Availability, Error>;

    /// Slots between `from` and `to` inclusive. `everyone` requires admin or
    /// the availability permission; otherwise only the caller's slots are
    /// returned.
    async fn list(
        &self,
        caller: &UserId,
        from: NaiveDate,
        to: NaiveDate,
        everyone: bool,
    ) -> Result<Vec<Availability>, Error>;

    async fn decide(&self, caller: &UserId, id: Uuid, approved: bool)
    -> Result<Availability, Error>;
}
