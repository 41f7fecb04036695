//! PostgreSQL-backed price list storage.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepairTypeRepository, RepairTypeRepositoryError};
use crate::domain::{BikeModel, RepairType, RepairTypeId};

use super::diesel_error_mapping::corrupt_row;
use super::models::RepairTypeRow;
use super::pool::DbPool;
use super::schema::repair_types;

#[derive(Clone)]
pub struct DieselRepairTypeRepository {
    pool: DbPool,
}

impl DieselRepairTypeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<&RepairType> for RepairTypeRow {
    fn from(repair: &RepairType) -> Self {
        Self {
            id: *repair.id.as_uuid(),
            name: repair.name.clone(),
            price_cents: repair.price_cents,
            points: repair.points,
            applicable_models: repair
                .applicable_models
                .iter()
                .map(|model| model.as_str().to_owned())
                .collect(),
            active: repair.active,
        }
    }
}

impl TryFrom<RepairTypeRow> for RepairType {
    type Error = RepairTypeRepositoryError;

    fn try_from(row: RepairTypeRow) -> Result<Self, Self::Error> {
        let applicable_models = row
            .applicable_models
            .iter()
            .map(|raw| raw.parse::<BikeModel>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| RepairTypeRepositoryError::corrupt(corrupt_row("repair_types", err)))?;
        Ok(Self {
            id: RepairTypeId::from_uuid(row.id),
            name: row.name,
            price_cents: row.price_cents,
            points: row.points,
            applicable_models,
            active: row.active,
        })
    }
}

#[async_trait]
impl RepairTypeRepository for DieselRepairTypeRepository {
    async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<RepairType>, RepairTypeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(RepairTypeRepositoryError::from)?;
        let mut query = repair_types::table
            .select(RepairTypeRow::as_select())
            .order(repair_types::name.asc())
            .into_boxed();
        if !include_inactive {
            query = query.filter(repair_types::active.eq(true));
        }
        let rows = query.load(&mut conn).await.map_err(RepairTypeRepositoryError::from)?;
        rows.into_iter().map(RepairType::try_from).collect()
    }

    async fn find(
        &self,
        id: &RepairTypeId,
    ) -> Result<Option<RepairType>, RepairTypeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(RepairTypeRepositoryError::from)?;
        let row: Option<RepairTypeRow> = repair_types::table
            .find(id.as_uuid())
            .select(RepairTypeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(RepairTypeRepositoryError::from)?;
        row.map(RepairType::try_from).transpose()
    }

    async fn names(
        &self,
        ids: &[RepairTypeId],
    ) -> Result<HashMap<RepairTypeId, String>, RepairTypeRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(RepairTypeRepositoryError::from)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid, String)> = repair_types::table
            .filter(repair_types::id.eq_any(&uuids))
            .select((repair_types::id, repair_types::name))
            .load(&mut conn)
            .await
            .map_err(RepairTypeRepositoryError::from)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| (RepairTypeId::from_uuid(id), name))
            .collect())
    }

    async fn insert(&self, repair_type: &RepairType) -> Result<(), RepairTypeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(RepairTypeRepositoryError::from)?;
        diesel::insert_into(repair_types::table)
            .values(RepairTypeRow::from(repair_type))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(RepairTypeRepositoryError::from)
    }

    async fn update(&self, repair_type: &RepairType) -> Result<(), RepairTypeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(RepairTypeRepositoryError::from)?;
        diesel::update(repair_types::table.find(repair_type.id.as_uuid()))
            .set(&RepairTypeRow::from(repair_type))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(RepairTypeRepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_list_round_trips_as_universal() {
        let row = RepairTypeRow {
            id: Uuid::new_v4(),
            name: "Band plakken".to_owned(),
            price_cents: 750,
            points: 1,
            applicable_models: Vec::new(),
            active: true,
        };
        let repair = RepairType::try_from(row).expect("decodes");
        assert!(repair.applies_to(BikeModel::Bakfiets));
    }

    #[test]
    fn unknown_model_is_corrupt() {
        let row = RepairTypeRow {
            id: Uuid::new_v4(),
            name: "Naaf".to_owned(),
            price_cents: 4500,
            points: 3,
            applicable_models: vec!["tandem".to_owned()],
            active: true,
        };
        assert!(matches!(
            RepairType::try_from(row),
            Err(RepairTypeRepositoryError::Corrupt { .. })
        ));
    }
}
