//! PostgreSQL-backed staff availability storage.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AvailabilityRepository, AvailabilityRepositoryError};
use crate::domain::{Availability, AvailabilityQuery, AvailabilityStatus, UserId};

use super::diesel_error_mapping::{corrupt_row, is_unique_violation};
use super::models::AvailabilityRow;
use super::pool::DbPool;
use super::schema::availability;

const ONE_SLOT_PER_DAY: &str = "availability_user_date_key";

#[derive(Clone)]
pub struct DieselAvailabilityRepository {
    pool: DbPool,
}

impl DieselAvailabilityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<&Availability> for AvailabilityRow {
    fn from(slot: &Availability) -> Self {
        Self {
            id: slot.id,
            user_id: *slot.user_id.as_uuid(),
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            notes: slot.notes.clone(),
            status: slot.status.as_str().to_owned(),
            created_at: slot.created_at,
        }
    }
}

impl TryFrom<AvailabilityRow> for Availability {
    type Error = AvailabilityRepositoryError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|err: String| {
            AvailabilityRepositoryError::corrupt(corrupt_row("availability", err))
        })?;
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            notes: row.notes,
            status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AvailabilityRepository for DieselAvailabilityRepository {
    async fn insert(&self, slot: &Availability) -> Result<(), AvailabilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AvailabilityRepositoryError::from)?;
        diesel::insert_into(availability::table)
            .values(AvailabilityRow::from(slot))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_unique_violation(&error, ONE_SLOT_PER_DAY) {
                    AvailabilityRepositoryError::date_taken(slot.date.to_string())
                } else {
                    AvailabilityRepositoryError::from(error)
                }
            })
    }

    async fn list(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Availability>, AvailabilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AvailabilityRepositoryError::from)?;
        let mut statement = availability::table
            .filter(availability::date.between(query.from, query.to))
            .select(AvailabilityRow::as_select())
            .order((availability::date.asc(), availability::start_time.asc()))
            .into_boxed();
        if let Some(user_id) = query.user_id {
            statement = statement.filter(availability::user_id.eq(*user_id.as_uuid()));
        }
        let rows = statement.load(&mut conn).await.map_err(AvailabilityRepositoryError::from)?;
        rows.into_iter().map(Availability::try_from).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AvailabilityStatus,
    ) -> Result<Option<Availability>, AvailabilityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(AvailabilityRepositoryError::from)?;
        let row: Option<AvailabilityRow> = diesel::update(availability::table.find(id))
            .set(availability::status.eq(status.as_str()))
            .returning(AvailabilityRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AvailabilityRepositoryError::from)?;
        row.map(Availability::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_now;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn status_survives_storage() {
        let slot = Availability {
            id: Uuid::new_v4(),
            user_id: UserId::random(),
            date: NaiveDate::from_ymd_opt(2024, 5, 6).expect("date"),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            end_time: NaiveTime::from_hms_opt(13, 0, 0).expect("time"),
            notes: None,
            status: AvailabilityStatus::Approved,
            created_at: fixture_now(),
        };
        let row = AvailabilityRow::from(&slot);
        assert_eq!(row.status, "approved");
        assert_eq!(Availability::try_from(row).expect("decodes"), slot);
    }
}
