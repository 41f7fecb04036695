//! Shared WebSocket adapter state.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::TableBoardQuery;
use crate::domain::{ChangeFeed, DEFAULT_BOARD_REFRESH};

/// Dependency bundle for the TV feed.
#[derive(Clone)]
pub struct WsState {
    pub board: Arc<dyn TableBoardQuery>,
    pub feed: ChangeFeed,
    /// Reconciliation period for each connection's observer.
    pub refresh: Duration,
}

impl WsState {
    pub fn new(board: Arc<dyn TableBoardQuery>, feed: ChangeFeed) -> Self {
        Self {
            board,
            feed,
            refresh: DEFAULT_BOARD_REFRESH,
        }
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }
}
