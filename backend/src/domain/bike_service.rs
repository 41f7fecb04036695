//! Bike intake, workflow updates and repair lines.
//!
//! Every successful mutation is announced on the [`ChangeFeed`] so the TV
//! board refreshes without waiting for its reconciliation tick.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AccountRepository, BikeIntake, BikeRepository, BikeRepositoryError, BikeWorkflow,
    RepairTypeRepository, WorkRegistrationRepository,
};
use crate::domain::service_support::{
    load_actor, map_account_error, map_bike_error, map_registration_error, map_repair_type_error,
};
use crate::domain::{
    Account, Approval, Bike, BikeFilter, BikeId, BoardChange, ChangeFeed, Error, Permission,
    RepairTypeId, Role, TableLabel, Transition, TransitionPolicy, UserId, WorkRegistration,
    WorkRegistrationId, WorkflowStatus,
};

/// Driven ports used by [`BikeService`].
pub struct BikeServiceSources<B, W, R, A> {
    pub bikes: Arc<B>,
    pub registrations: Arc<W>,
    pub repair_types: Arc<R>,
    pub accounts: Arc<A>,
}

/// Service implementing [`BikeWorkflow`].
pub struct BikeService<B, W, R, A> {
    bikes: Arc<B>,
    registrations: Arc<W>,
    repair_types: Arc<R>,
    accounts: Arc<A>,
    feed: ChangeFeed,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
}

impl<B, W, R, A> BikeService<B, W, R, A> {
    pub fn new(
        sources: BikeServiceSources<B, W, R, A>,
        feed: ChangeFeed,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let BikeServiceSources {
            bikes,
            registrations,
            repair_types,
            accounts,
        } = sources;
        Self {
            bikes,
            registrations,
            repair_types,
            accounts,
            feed,
            clock,
            policy: TransitionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

fn occupied(table: impl Into<String>) -> Error {
    let table = table.into();
    Error::conflict(format!("table {table} is already occupied"))
        .with_details(json!({ "table": table, "code": "table_occupied" }))
}

fn map_bike_write_error(error: BikeRepositoryError) -> Error {
    match error {
        BikeRepositoryError::TableOccupied { table } => occupied(table),
        other => map_bike_error(other),
    }
}

/// Mechanics and admins do the hands-on work.
fn require_mechanic(actor: &Account) -> Result<(), Error> {
    if matches!(actor.role, Role::Monteur | Role::Admin) {
        Ok(())
    } else {
        Err(Error::forbidden("mechanic role required"))
    }
}

/// Front-of-house decides on repairs with the customer.
fn require_front_office(actor: &Account) -> Result<(), Error> {
    if actor.role == Role::Foh || actor.has_permission(Permission::CallStatus) {
        Ok(())
    } else {
        Err(Error::forbidden("front-of-house role required"))
    }
}

impl<B, W, R, A> BikeService<B, W, R, A>
where
    B: BikeRepository,
    W: WorkRegistrationRepository,
    R: RepairTypeRepository,
    A: AccountRepository,
{
    async fn bike(&self, id: &BikeId) -> Result<Bike, Error> {
        self.bikes
            .find(id)
            .await
            .map_err(map_bike_error)?
            .ok_or_else(|| Error::not_found(format!("bike {id} not found")))
    }

    async fn registration(&self, id: &WorkRegistrationId) -> Result<WorkRegistration, Error> {
        self.registrations
            .find(id)
            .await
            .map_err(map_registration_error)?
            .ok_or_else(|| Error::not_found(format!("work registration {id} not found")))
    }

    async fn ensure_table_free(&self, table: TableLabel, bike: &BikeId) -> Result<(), Error> {
        let holder = self
            .bikes
            .find_at_table(table)
            .await
            .map_err(map_bike_error)?;
        match holder {
            Some(other) if other.id != *bike => Err(occupied(table.to_string())),
            _ => Ok(()),
        }
    }

    async fn save_bike(&self, mut bike: Bike) -> Result<Bike, Error> {
        bike.updated_at = self.clock.utc();
        self.bikes
            .update(&bike)
            .await
            .map_err(map_bike_write_error)?;
        self.feed.publish(BoardChange::Bikes);
        Ok(bike)
    }

    async fn save_registration(
        &self,
        registration: WorkRegistration,
    ) -> Result<WorkRegistration, Error> {
        self.registrations
            .update(&registration)
            .await
            .map_err(map_registration_error)?;
        self.feed.publish(BoardChange::Registrations);
        Ok(registration)
    }
}

#[async_trait]
impl<B, W, R, A> BikeWorkflow for BikeService<B, W, R, A>
where
    B: BikeRepository,
    W: WorkRegistrationRepository,
    R: RepairTypeRepository,
    A: AccountRepository,
{
    async fn intake(&self, caller: &UserId, intake: BikeIntake) -> Result<Bike, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        let id = BikeId::random();
        if let Some(table) = intake.table {
            self.ensure_table_free(table, &id).await?;
        }
        let now = self.clock.utc();
        let customer_note = intake
            .customer_note
            .map(|note| note.trim().to_owned())
            .filter(|note| !note.is_empty());
        let bike = Bike {
            id,
            frame_number: intake.frame_number,
            model: intake.model,
            workflow_status: WorkflowStatus::DiagnoseNodig,
            table: intake.table,
            current_mechanic_id: None,
            diagnosed_by_id: None,
            customer_note,
            created_at: now,
            updated_at: now,
        };
        self.bikes
            .insert(&bike)
            .await
            .map_err(map_bike_write_error)?;
        info!(bike = %bike.id, frame_number = %bike.frame_number, %caller, "bike taken in");
        self.feed.publish(BoardChange::Bikes);
        Ok(bike)
    }

    async fn list(&self, caller: &UserId, filter: BikeFilter) -> Result<Vec<Bike>, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        self.bikes.list(&filter).await.map_err(map_bike_error)
    }

    async fn get(&self, caller: &UserId, bike: &BikeId) -> Result<Bike, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        self.bike(bike).await
    }

    async fn update_status(
        &self,
        caller: &UserId,
        bike: &BikeId,
        status: WorkflowStatus,
    ) -> Result<Bike, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        let mut current = self.bike(bike).await?;
        let from = current.workflow_status;
        match self.policy.check(from, status)? {
            Transition::Unchanged => Ok(current),
            Transition::Move => {
                current.workflow_status = status;
                let saved = self.save_bike(current).await?;
                info!(%bike, from = from.as_str(), to = status.as_str(), %caller, "bike status changed");
                Ok(saved)
            }
        }
    }

    async fn assign_table(
        &self,
        caller: &UserId,
        bike: &BikeId,
        table: Option<TableLabel>,
    ) -> Result<Bike, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        let mut current = self.bike(bike).await?;
        if current.table == table {
            return Ok(current);
        }
        if let Some(label) = table {
            if current.is_completed() {
                return Err(Error::conflict("completed bikes cannot be placed on a table")
                    .with_details(json!({ "code": "bike_completed" })));
            }
            self.ensure_table_free(label, bike).await?;
        }
        current.table = table;
        let saved = self.save_bike(current).await?;
        info!(%bike, table = ?table.map(|label| label.to_string()), %caller, "bike table changed");
        Ok(saved)
    }

    async fn assign_mechanic(
        &self,
        caller: &UserId,
        bike: &BikeId,
        mechanic: Option<UserId>,
    ) -> Result<Bike, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        let mut current = self.bike(bike).await?;
        if let Some(mechanic_id) = mechanic.as_ref() {
            let account = self
                .accounts
                .find(mechanic_id)
                .await
                .map_err(map_account_error)?
                .ok_or_else(|| Error::not_found(format!("account {mechanic_id} not found")))?;
            account.require_enabled()?;
            if matches!(
                current.workflow_status,
                WorkflowStatus::DiagnoseNodig | WorkflowStatus::DiagnoseBezig
            ) {
                current.diagnosed_by_id = Some(*mechanic_id);
            }
        }
        current.current_mechanic_id = mechanic;
        self.save_bike(current).await
    }

    async fn registrations(
        &self,
        caller: &UserId,
        bike: &BikeId,
    ) -> Result<Vec<WorkRegistration>, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        self.bike(bike).await?;
        self.registrations
            .for_bikes(std::slice::from_ref(bike))
            .await
            .map_err(map_registration_error)
    }

    async fn propose_registration(
        &self,
        caller: &UserId,
        bike: &BikeId,
        repair_type: &RepairTypeId,
    ) -> Result<WorkRegistration, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        require_mechanic(&actor)?;
        let current = self.bike(bike).await?;
        if current.is_completed() {
            return Err(Error::conflict("bike is already completed")
                .with_details(json!({ "code": "bike_completed" })));
        }
        let repair = self
            .repair_types
            .find(repair_type)
            .await
            .map_err(map_repair_type_error)?
            .ok_or_else(|| Error::not_found(format!("repair type {repair_type} not found")))?;
        if !repair.active {
            return Err(Error::conflict(format!("repair type '{}' is inactive", repair.name))
                .with_details(json!({ "code": "repair_type_inactive" })));
        }
        if !repair.applies_to(current.model) {
            return Err(Error::invalid_request(format!(
                "repair type '{}' does not apply to {}",
                repair.name,
                current.model.as_str()
            ))
            .with_details(json!({ "code": "repair_type_not_applicable" })));
        }
        let registration = WorkRegistration {
            id: WorkRegistrationId::random(),
            bike_id: current.id,
            repair_type_id: repair.id,
            approval: Approval::Proposed,
            completed: false,
            proposed_by: *caller,
            completed_by: None,
            completed_at: None,
            created_at: self.clock.utc(),
        };
        self.registrations
            .insert(&registration)
            .await
            .map_err(map_registration_error)?;
        info!(%bike, registration = %registration.id, repair = %repair.name, "repair proposed");
        self.feed.publish(BoardChange::Registrations);
        Ok(registration)
    }

    async fn decide_registration(
        &self,
        caller: &UserId,
        registration: &WorkRegistrationId,
        approved: bool,
    ) -> Result<WorkRegistration, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        require_front_office(&actor)?;
        let mut current = self.registration(registration).await?;
        current.decide(approved)?;
        info!(%registration, approved, %caller, "repair decided");
        self.save_registration(current).await
    }

    async fn complete_registration(
        &self,
        caller: &UserId,
        registration: &WorkRegistrationId,
    ) -> Result<WorkRegistration, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        require_mechanic(&actor)?;
        let mut current = self.registration(registration).await?;
        if current.completed {
            return Ok(current);
        }
        current.complete(*caller, self.clock.utc())?;
        info!(%registration, %caller, "repair completed");
        self.save_registration(current).await
    }
}
