//! Port for bike persistence.

use async_trait::async_trait;

use crate::domain::{Bike, BikeFilter, BikeId, TableLabel};

use super::define_port_error;

define_port_error! {
    /// Errors raised by bike adapters.
    pub enum BikeRepositoryError {
        Connection { message: String } =>
            "bike repository connection failed: {message}",
        Query { message: String } =>
            "bike repository query failed: {message}",
        /// Another open bike already sits at the table.
        TableOccupied { table: String } =>
            "table {table} is already occupied",
        Corrupt { message: String } =>
            "bike row is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BikeRepository: Send + Sync {
    async fn insert(&self, bike: &Bike) -> Result<(), BikeRepositoryError>;

    /// Persist every mutable field of `bike`.
    ///
    /// Adapters reject a table already held by another open bike with
    /// [`BikeRepositoryError::TableOccupied`].
    async fn update(&self, bike: &Bike) -> Result<(), BikeRepositoryError>;

    async fn find(&self, id: &BikeId) -> Result<Option<Bike>, BikeRepositoryError>;

    /// Bikes matching `filter`, newest first.
    async fn list(&self, filter: &BikeFilter) -> Result<Vec<Bike>, BikeRepositoryError>;

    /// Open bike currently parked at `table`.
    async fn find_at_table(&self, table: TableLabel) -> Result<Option<Bike>, BikeRepositoryError>;

    /// Every open bike that has a table.
    async fn on_tables(&self) -> Result<Vec<Bike>, BikeRepositoryError>;
}
