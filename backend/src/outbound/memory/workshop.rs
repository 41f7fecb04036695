//! Bikes, work registrations and the price list.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ports::{
    BikeRepository, BikeRepositoryError, RepairTypeRepository, RepairTypeRepositoryError,
    WorkRegistrationRepository, WorkRegistrationRepositoryError,
};
use crate::domain::{
    Bike, BikeFilter, BikeId, RepairType, RepairTypeId, TableLabel, WorkRegistration,
    WorkRegistrationId,
};

use super::{MemoryStore, lock};

/// Mirror of the partial unique index on open bikes' tables.
fn check_table_free(
    bikes: &HashMap<BikeId, Bike>,
    bike: &Bike,
) -> Result<(), BikeRepositoryError> {
    let Some(table) = bike.table.filter(|_| !bike.is_completed()) else {
        return Ok(());
    };
    let taken = bikes
        .values()
        .any(|other| other.id != bike.id && !other.is_completed() && other.table == Some(table));
    if taken {
        return Err(BikeRepositoryError::table_occupied(table.to_string()));
    }
    Ok(())
}

#[async_trait]
impl BikeRepository for MemoryStore {
    async fn insert(&self, bike: &Bike) -> Result<(), BikeRepositoryError> {
        let mut bikes = lock(&self.bikes);
        check_table_free(&bikes, bike)?;
        bikes.insert(bike.id, bike.clone());
        Ok(())
    }

    async fn update(&self, bike: &Bike) -> Result<(), BikeRepositoryError> {
        let mut bikes = lock(&self.bikes);
        check_table_free(&bikes, bike)?;
        bikes.insert(bike.id, bike.clone());
        Ok(())
    }

    async fn find(&self, id: &BikeId) -> Result<Option<Bike>, BikeRepositoryError> {
        Ok(lock(&self.bikes).get(id).cloned())
    }

    async fn list(&self, filter: &BikeFilter) -> Result<Vec<Bike>, BikeRepositoryError> {
        let mut bikes: Vec<Bike> = lock(&self.bikes)
            .values()
            .filter(|bike| filter.matches(bike))
            .cloned()
            .collect();
        bikes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bikes)
    }

    async fn find_at_table(&self, table: TableLabel) -> Result<Option<Bike>, BikeRepositoryError> {
        Ok(lock(&self.bikes)
            .values()
            .find(|bike| !bike.is_completed() && bike.table == Some(table))
            .cloned())
    }

    async fn on_tables(&self) -> Result<Vec<Bike>, BikeRepositoryError> {
        Ok(lock(&self.bikes)
            .values()
            .filter(|bike| !bike.is_completed() && bike.table.is_some())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WorkRegistrationRepository for MemoryStore {
    async fn insert(
        &self,
        registration: &WorkRegistration,
    ) -> Result<(), WorkRegistrationRepositoryError> {
        lock(&self.registrations).insert(registration.id, registration.clone());
        Ok(())
    }

    async fn update(
        &self,
        registration: &WorkRegistration,
    ) -> Result<(), WorkRegistrationRepositoryError> {
        lock(&self.registrations).insert(registration.id, registration.clone());
        Ok(())
    }

    async fn find(
        &self,
        id: &WorkRegistrationId,
    ) -> Result<Option<WorkRegistration>, WorkRegistrationRepositoryError> {
        Ok(lock(&self.registrations).get(id).cloned())
    }

    async fn for_bikes(
        &self,
        bikes: &[BikeId],
    ) -> Result<Vec<WorkRegistration>, WorkRegistrationRepositoryError> {
        let mut registrations: Vec<WorkRegistration> = lock(&self.registrations)
            .values()
            .filter(|registration| bikes.contains(&registration.bike_id))
            .cloned()
            .collect();
        registrations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(registrations)
    }
}

#[async_trait]
impl RepairTypeRepository for MemoryStore {
    async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<RepairType>, RepairTypeRepositoryError> {
        let mut repair_types: Vec<RepairType> = lock(&self.repair_types)
            .values()
            .filter(|repair_type| include_inactive || repair_type.active)
            .cloned()
            .collect();
        repair_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(repair_types)
    }

    async fn find(
        &self,
        id: &RepairTypeId,
    ) -> Result<Option<RepairType>, RepairTypeRepositoryError> {
        Ok(lock(&self.repair_types).get(id).cloned())
    }

    async fn names(
        &self,
        ids: &[RepairTypeId],
    ) -> Result<HashMap<RepairTypeId, String>, RepairTypeRepositoryError> {
        let repair_types = lock(&self.repair_types);
        Ok(ids
            .iter()
            .filter_map(|id| repair_types.get(id).map(|rt| (*id, rt.name.clone())))
            .collect())
    }

    async fn insert(&self, repair_type: &RepairType) -> Result<(), RepairTypeRepositoryError> {
        lock(&self.repair_types).insert(repair_type.id, repair_type.clone());
        Ok(())
    }

    async fn update(&self, repair_type: &RepairType) -> Result<(), RepairTypeRepositoryError> {
        lock(&self.repair_types).insert(repair_type.id, repair_type.clone());
        Ok(())
    }
}
