//! PostgreSQL-backed `WorkRegistrationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{WorkRegistrationRepository, WorkRegistrationRepositoryError};
use crate::domain::{BikeId, RepairTypeId, UserId, WorkRegistration, WorkRegistrationId};

use super::diesel_error_mapping::corrupt_row;
use super::models::WorkRegistrationRow;
use super::pool::DbPool;
use super::schema::work_registrations;

#[derive(Clone)]
pub struct DieselWorkRegistrationRepository {
    pool: DbPool,
}

impl DieselWorkRegistrationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<&WorkRegistration> for WorkRegistrationRow {
    fn from(registration: &WorkRegistration) -> Self {
        Self {
            id: *registration.id.as_uuid(),
            bike_id: *registration.bike_id.as_uuid(),
            repair_type_id: *registration.repair_type_id.as_uuid(),
            approval: registration.approval.as_str().to_owned(),
            completed: registration.completed,
            proposed_by: *registration.proposed_by.as_uuid(),
            completed_by: registration.completed_by.map(|id| *id.as_uuid()),
            completed_at: registration.completed_at,
            created_at: registration.created_at,
        }
    }
}

impl TryFrom<WorkRegistrationRow> for WorkRegistration {
    type Error = WorkRegistrationRepositoryError;

    fn try_from(row: WorkRegistrationRow) -> Result<Self, Self::Error> {
        let approval = row.approval.parse().map_err(|err: String| {
            WorkRegistrationRepositoryError::corrupt(corrupt_row("work_registrations", err))
        })?;
        Ok(Self {
            id: WorkRegistrationId::from_uuid(row.id),
            bike_id: BikeId::from_uuid(row.bike_id),
            repair_type_id: RepairTypeId::from_uuid(row.repair_type_id),
            approval,
            completed: row.completed,
            proposed_by: UserId::from_uuid(row.proposed_by),
            completed_by: row.completed_by.map(UserId::from_uuid),
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl WorkRegistrationRepository for DieselWorkRegistrationRepository {
    async fn insert(
        &self,
        registration: &WorkRegistration,
    ) -> Result<(), WorkRegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(WorkRegistrationRepositoryError::from)?;
        diesel::insert_into(work_registrations::table)
            .values(WorkRegistrationRow::from(registration))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(WorkRegistrationRepositoryError::from)
    }

    async fn update(
        &self,
        registration: &WorkRegistration,
    ) -> Result<(), WorkRegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(WorkRegistrationRepositoryError::from)?;
        diesel::update(work_registrations::table.find(registration.id.as_uuid()))
            .set(&WorkRegistrationRow::from(registration))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(WorkRegistrationRepositoryError::from)
    }

    async fn find(
        &self,
        id: &WorkRegistrationId,
    ) -> Result<Option<WorkRegistration>, WorkRegistrationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(WorkRegistrationRepositoryError::from)?;
        let row: Option<WorkRegistrationRow> = work_registrations::table
            .find(id.as_uuid())
            .select(WorkRegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(WorkRegistrationRepositoryError::from)?;
        row.map(WorkRegistration::try_from).transpose()
    }

    async fn for_bikes(
        &self,
        bikes: &[BikeId],
    ) -> Result<Vec<WorkRegistration>, WorkRegistrationRepositoryError> {
        if bikes.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(WorkRegistrationRepositoryError::from)?;
        let ids: Vec<Uuid> = bikes.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<WorkRegistrationRow> = work_registrations::table
            .filter(work_registrations::bike_id.eq_any(&ids))
            .select(WorkRegistrationRow::as_select())
            .order(work_registrations::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(WorkRegistrationRepositoryError::from)?;
        rows.into_iter().map(WorkRegistration::try_from).collect()
    }
}
