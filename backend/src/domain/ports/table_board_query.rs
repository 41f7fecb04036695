//! Driving port for the TV board read model.

use async_trait::async_trait;

use crate::domain::{Error, TableBoard};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableBoardQuery: Send + Sync {
    /// Build a fresh snapshot of every table.
    async fn snapshot(&self) -> Result<TableBoard, Error>;
}
