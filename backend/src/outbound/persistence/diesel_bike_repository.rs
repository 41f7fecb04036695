//! PostgreSQL-backed `BikeRepository`.
//!
//! Table occupancy is enforced by the partial unique index
//! `bikes_open_table_idx`; a violation surfaces as
//! [`BikeRepositoryError::TableOccupied`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BikeRepository, BikeRepositoryError};
use crate::domain::{Bike, BikeFilter, BikeId, FrameNumber, TableLabel, UserId, WorkflowStatus};

use super::diesel_error_mapping::{corrupt_row, is_unique_violation};
use super::models::BikeRow;
use super::pool::DbPool;
use super::schema::bikes;

const OPEN_TABLE_INDEX: &str = "bikes_open_table_idx";

#[derive(Clone)]
pub struct DieselBikeRepository {
    pool: DbPool,
}

impl DieselBikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map write errors, translating the occupancy index into a domain error.
fn map_write_error(bike: &Bike) -> impl FnOnce(DieselError) -> BikeRepositoryError + '_ {
    move |error| {
        if is_unique_violation(&error, OPEN_TABLE_INDEX) {
            let table = bike.table.map(|label| label.to_string()).unwrap_or_default();
            BikeRepositoryError::table_occupied(table)
        } else {
            BikeRepositoryError::from(error)
        }
    }
}

impl From<&Bike> for BikeRow {
    fn from(bike: &Bike) -> Self {
        Self {
            id: *bike.id.as_uuid(),
            frame_number: bike.frame_number.as_ref().to_owned(),
            model: bike.model.as_str().to_owned(),
            workflow_status: bike.workflow_status.as_str().to_owned(),
            table_number: bike.table.map(|label| label.to_string()),
            current_mechanic_id: bike.current_mechanic_id.map(|id| *id.as_uuid()),
            diagnosed_by_id: bike.diagnosed_by_id.map(|id| *id.as_uuid()),
            customer_note: bike.customer_note.clone(),
            created_at: bike.created_at,
            updated_at: bike.updated_at,
        }
    }
}

impl TryFrom<BikeRow> for Bike {
    type Error = BikeRepositoryError;

    fn try_from(row: BikeRow) -> Result<Self, Self::Error> {
        let corrupt = |err: &dyn std::fmt::Display| {
            BikeRepositoryError::corrupt(corrupt_row("bikes", err))
        };
        Ok(Self {
            id: BikeId::from_uuid(row.id),
            frame_number: FrameNumber::new(&row.frame_number).map_err(|err| corrupt(&err))?,
            model: row.model.parse().map_err(|err| corrupt(&err))?,
            workflow_status: row.workflow_status.parse().map_err(|err| corrupt(&err))?,
            table: row
                .table_number
                .as_deref()
                .map(str::parse::<TableLabel>)
                .transpose()
                .map_err(|err| corrupt(&err))?,
            current_mechanic_id: row.current_mechanic_id.map(UserId::from_uuid),
            diagnosed_by_id: row.diagnosed_by_id.map(UserId::from_uuid),
            customer_note: row.customer_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_bikes(rows: Vec<BikeRow>) -> Result<Vec<Bike>, BikeRepositoryError> {
    rows.into_iter().map(Bike::try_from).collect()
}

/// `LIKE` pattern matching `needle` anywhere in a normalised frame number.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .to_uppercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl BikeRepository for DieselBikeRepository {
    async fn insert(&self, bike: &Bike) -> Result<(), BikeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(BikeRepositoryError::from)?;
        diesel::insert_into(bikes::table)
            .values(BikeRow::from(bike))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_write_error(bike))
    }

    async fn update(&self, bike: &Bike) -> Result<(), BikeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(BikeRepositoryError::from)?;
        diesel::update(bikes::table.find(bike.id.as_uuid()))
            .set(&BikeRow::from(bike))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_write_error(bike))
    }

    async fn find(&self, id: &BikeId) -> Result<Option<Bike>, BikeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(BikeRepositoryError::from)?;
        let row: Option<BikeRow> = bikes::table
            .find(id.as_uuid())
            .select(BikeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(BikeRepositoryError::from)?;
        row.map(Bike::try_from).transpose()
    }

    async fn list(&self, filter: &BikeFilter) -> Result<Vec<Bike>, BikeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(BikeRepositoryError::from)?;
        let mut query = bikes::table
            .select(BikeRow::as_select())
            .order(bikes::created_at.desc())
            .into_boxed();
        if !filter.include_completed {
            query = query.filter(bikes::workflow_status.ne(WorkflowStatus::Afgerond.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(bikes::workflow_status.eq(status.as_str()));
        }
        if let Some(needle) = filter.frame_number_contains.as_deref() {
            query = query.filter(bikes::frame_number.like(contains_pattern(needle)));
        }
        let rows = query.load(&mut conn).await.map_err(BikeRepositoryError::from)?;
        into_bikes(rows)
    }

    async fn find_at_table(&self, table: TableLabel) -> Result<Option<Bike>, BikeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(BikeRepositoryError::from)?;
        let row: Option<BikeRow> = bikes::table
            .filter(bikes::table_number.eq(table.to_string()))
            .filter(bikes::workflow_status.ne(WorkflowStatus::Afgerond.as_str()))
            .select(BikeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(BikeRepositoryError::from)?;
        row.map(Bike::try_from).transpose()
    }

    async fn on_tables(&self) -> Result<Vec<Bike>, BikeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(BikeRepositoryError::from)?;
        let rows = bikes::table
            .filter(bikes::table_number.is_not_null())
            .filter(bikes::workflow_status.ne(WorkflowStatus::Afgerond.as_str()))
            .select(BikeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(BikeRepositoryError::from)?;
        into_bikes(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BikeModel;
    use crate::test_support::fixture_now;
    use rstest::rstest;

    fn bike() -> Bike {
        Bike {
            id: BikeId::random(),
            frame_number: FrameNumber::new("wv-1234").expect("frame number"),
            model: BikeModel::Bakfiets,
            workflow_status: WorkflowStatus::InReparatie,
            table: Some(TableLabel::Lettered('C')),
            current_mechanic_id: Some(UserId::random()),
            diagnosed_by_id: None,
            customer_note: Some("rammelt".to_owned()),
            created_at: fixture_now(),
            updated_at: fixture_now(),
        }
    }

    #[test]
    fn rows_carry_storage_names() {
        let row = BikeRow::from(&bike());
        assert_eq!(row.model, "bakfiets");
        assert_eq!(row.workflow_status, "in_reparatie");
        assert_eq!(row.table_number.as_deref(), Some("C"));
    }

    #[test]
    fn rows_decode_back_into_bikes() {
        let original = bike();
        let decoded = Bike::try_from(BikeRow::from(&original)).expect("decodes");
        assert_eq!(decoded, original);
    }

    #[test]
    fn unknown_table_is_corrupt() {
        let mut row = BikeRow::from(&bike());
        row.table_number = Some("99".to_owned());
        assert!(matches!(
            Bike::try_from(row),
            Err(BikeRepositoryError::Corrupt { .. })
        ));
    }

    #[rstest]
    #[case("12", "%12%")]
    #[case("ab_", "%AB\\_%")]
    #[case("50%", "%50\\%%")]
    fn search_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(needle), expected);
    }
}
