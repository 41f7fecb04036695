//! Change notifications for the TV board.
//!
//! Mutating services publish a [`BoardChange`] on the shared [`ChangeFeed`].
//! Consumers do not subscribe to the feed directly: a
//! [`TableBoardObserver`] merges the pushed events with a periodic
//! reconciliation tick, so a missed or lagged event only delays an update
//! until the next tick.

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardChange {
    Bikes,
    Registrations,
    Announcements,
}

/// Why an observer woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTrigger {
    /// A service published a change.
    Pushed(BoardChange),
    /// Events were dropped because the consumer fell behind.
    Lagged,
    /// Periodic reconciliation tick.
    Reconcile,
}

/// Default reconciliation period.
pub const DEFAULT_BOARD_REFRESH: Duration = Duration::from_secs(5);

const FEED_CAPACITY: usize = 64;

/// In-process broadcast of board changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<BoardChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Notify every observer. Having no observers is not an error.
    pub fn publish(&self, change: BoardChange) {
        match self.sender.send(change) {
            Ok(receivers) => debug!(?change, receivers, "board change published"),
            Err(_) => debug!(?change, "board change published without observers"),
        }
    }

    /// Create an observer that also wakes every `period`.
    #[must_use]
    pub fn observe(&self, period: Duration) -> TableBoardObserver {
        TableBoardObserver::new(self.sender.subscribe(), period)
    }
}

/// Single change source for board consumers.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use workshop::domain::{BoardChange, BoardTrigger, ChangeFeed};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let feed = ChangeFeed::new();
/// let mut observer = feed.observe(Duration::from_secs(60));
/// feed.publish(BoardChange::Bikes);
/// assert_eq!(observer.changed().await, BoardTrigger::Pushed(BoardChange::Bikes));
/// # });
/// ```
pub struct TableBoardObserver {
    receiver: broadcast::Receiver<BoardChange>,
    tick: Interval,
    feed_open: bool,
}

impl TableBoardObserver {
    fn new(receiver: broadcast::Receiver<BoardChange>, period: Duration) -> Self {
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            receiver,
            tick,
            feed_open: true,
        }
    }

    /// Wait for the next reason to rebuild the board.
    ///
    /// Once every publisher is gone only the tick remains.
    pub async fn changed(&mut self) -> BoardTrigger {
        if !self.feed_open {
            self.tick.tick().await;
            return BoardTrigger::Reconcile;
        }
        let received = tokio::select! {
            received = self.receiver.recv() => Some(received),
            _ = self.tick.tick() => None,
        };
        match received {
            None => BoardTrigger::Reconcile,
            Some(Ok(change)) => BoardTrigger::Pushed(change),
            Some(Err(RecvError::Lagged(skipped))) => {
                warn!(skipped, "board observer lagged behind the change feed");
                BoardTrigger::Lagged
            }
            Some(Err(RecvError::Closed)) => {
                self.feed_open = false;
                self.tick.tick().await;
                BoardTrigger::Reconcile
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tick_fires_without_events() {
        let feed = ChangeFeed::new();
        let mut observer = feed.observe(Duration::from_secs(5));
        assert_eq!(observer.changed().await, BoardTrigger::Reconcile);
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_events_arrive_before_the_tick() {
        let feed = ChangeFeed::new();
        let mut observer = feed.observe(Duration::from_secs(5));
        feed.publish(BoardChange::Registrations);
        assert_eq!(
            observer.changed().await,
            BoardTrigger::Pushed(BoardChange::Registrations)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_reports_lag() {
        let feed = ChangeFeed::new();
        let mut observer = feed.observe(Duration::from_secs(5));
        for _ in 0..=FEED_CAPACITY {
            feed.publish(BoardChange::Bikes);
        }
        assert_eq!(observer.changed().await, BoardTrigger::Lagged);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_feed_falls_back_to_ticks() {
        let feed = ChangeFeed::new();
        let mut observer = feed.observe(Duration::from_secs(5));
        drop(feed);
        assert_eq!(observer.changed().await, BoardTrigger::Reconcile);
        assert_eq!(observer.changed().await, BoardTrigger::Reconcile);
    }

    #[test]
    fn publishing_without_observers_is_harmless() {
        ChangeFeed::new().publish(BoardChange::Announcements);
    }
}
