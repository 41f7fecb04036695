//! Driving port for bikes and their repair lines.

use async_trait::async_trait;

use crate::domain::{
    Bike, BikeFilter, BikeId, BikeModel, Error, FrameNumber, RepairTypeId, TableLabel, UserId,
    WorkRegistration, WorkRegistrationId, WorkflowStatus,
};

/// Data captured when a bike is brought in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BikeIntake {
    pub frame_number: FrameNumber,
    pub model: BikeModel,
    pub table: Option<TableLabel>,
    pub customer_note: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BikeWorkflow: Send + Sync {
    async fn intake(&self, caller: &UserId, intake: BikeIntake) -> Result<Bike, Error>;

    async fn list(&self, caller: &UserId, filter: BikeFilter) -> Result<Vec<Bike>, Error>;

    async fn get(&self, caller: &UserId, bike: &BikeId) -> Result<Bike, Error>;

    /// Write a new status, subject to the configured transition policy.
    async fn update_status(
        &self,
        caller: &UserId,
        bike: &BikeId,
        status: WorkflowStatus,
    ) -> Result<Bike, Error>;

    /// Park the bike at a table, or clear its table with `None`.
    async fn assign_table(
        &self,
        caller: &UserId,
        bike: &BikeId,
        table: Option<TableLabel>,
    ) -> Result<Bike, Error>;

    /// Set or clear the mechanic currently working on the bike.
    async fn assign_mechanic(
        &self,
        caller: &UserId,
        bike: &BikeId,
        mechanic: Option<UserId>,
    ) -> Result<Bike, Error>;

    async fn registrations(
        &self,
        caller: &UserId,
        bike: &BikeId,
    ) -> Result<Vec<WorkRegistration>, Error>;

    /// Propose a repair during diagnosis.
    async fn propose_registration(
        &self,
        caller: &UserId,
        bike: &BikeId,
        repair_type: &RepairTypeId,
    ) -> Result<WorkRegistration, Error>;

    /// Front-of-house decision after contacting the customer.
    async fn decide_registration(
        &self,
        caller: &UserId,
        registration: &WorkRegistrationId,
        approved: bool,
    ) -> Result<WorkRegistration, Error>;

    async fn complete_registration(
        &self,
        caller: &UserId,
        registration: &WorkRegistrationId,
    ) -> Result<WorkRegistration, Error>;
}
