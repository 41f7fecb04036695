//! PostgreSQL-backed attempt limiter.
//!
//! One conditional upsert both checks and consumes a slot, so concurrent
//! requests for the same key can never exceed the budget. When the upsert
//! touches no row the budget is spent and the stored window is read back
//! to report the retry time. A successful attempt may reset the key between
//! the two statements; the upsert is then run once more.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text, Timestamptz};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{RateLimitRepository, RateLimitRepositoryError};
use crate::domain::{AttemptWindow, RateLimitKey, RateLimitPolicy, SlotAcquisition};

use super::models::AttemptRow;
use super::pool::DbPool;
use super::schema::rate_limit_attempts;

#[derive(Clone)]
pub struct DieselRateLimitRepository {
    pool: DbPool,
}

impl DieselRateLimitRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Upsert rounds before giving up on a key that keeps being reset.
const ACQUIRE_ROUNDS: usize = 2;

// $1 key, $2 now, $3 window in seconds, $4 max attempts.
const ACQUIRE_SQL: &str = r#"
INSERT INTO rate_limit_attempts AS stored (key, attempts, window_start)
VALUES ($1, 1, $2)
ON CONFLICT (key) DO UPDATE SET
    attempts = CASE
        WHEN $2 > stored.window_start + ($3::float8 * interval '1 second') THEN 1
        ELSE stored.attempts + 1
    END,
    window_start = CASE
        WHEN $2 > stored.window_start + ($3::float8 * interval '1 second') THEN $2
        ELSE stored.window_start
    END
WHERE $2 > stored.window_start + ($3::float8 * interval '1 second')
   OR stored.attempts < $4
RETURNING attempts, window_start
"#;

fn to_window(row: AttemptRow) -> Result<AttemptWindow, RateLimitRepositoryError> {
    let attempts = u32::try_from(row.attempts)
        .map_err(|_| RateLimitRepositoryError::query("negative attempt counter"))?;
    Ok(AttemptWindow {
        attempts,
        window_start: row.window_start,
    })
}

/// Exhausted window read back after a refused upsert, `None` when the row
/// was deleted in the meantime.
fn exhausted(
    stored: Option<AttemptRow>,
) -> Result<Option<SlotAcquisition>, RateLimitRepositoryError> {
    stored
        .map(|row| to_window(row).map(SlotAcquisition::Exhausted))
        .transpose()
}

#[async_trait]
impl RateLimitRepository for DieselRateLimitRepository {
    async fn try_acquire(
        &self,
        key: &RateLimitKey,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<SlotAcquisition, RateLimitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(RateLimitRepositoryError::from)?;
        let max_attempts = i32::try_from(policy.max_attempts).unwrap_or(i32::MAX);

        for _ in 0..ACQUIRE_ROUNDS {
            let acquired: Option<AttemptRow> = sql_query(ACQUIRE_SQL)
                .bind::<Text, _>(key.as_str())
                .bind::<Timestamptz, _>(now)
                .bind::<BigInt, _>(policy.window.num_seconds())
                .bind::<Integer, _>(max_attempts)
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(RateLimitRepositoryError::from)?;
            if let Some(row) = acquired {
                return to_window(row).map(SlotAcquisition::Acquired);
            }

            let stored: Option<AttemptRow> = rate_limit_attempts::table
                .find(key.as_str())
                .select(AttemptRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(RateLimitRepositoryError::from)?;
            if let Some(outcome) = exhausted(stored)? {
                return Ok(outcome);
            }
            debug!(%key, "attempt window was reset during acquisition; retrying");
        }
        Err(RateLimitRepositoryError::query(
            "attempt window kept being reset during acquisition",
        ))
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(RateLimitRepositoryError::from)?;
        diesel::delete(rate_limit_attempts::table.find(key.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(RateLimitRepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_now;

    #[test]
    fn negative_counters_are_rejected() {
        let row = AttemptRow {
            attempts: -1,
            window_start: fixture_now(),
        };
        assert!(to_window(row).is_err());
    }

    #[test]
    fn vanished_window_asks_for_another_round() {
        assert!(matches!(exhausted(None), Ok(None)));
    }

    #[test]
    fn stored_window_is_reported_as_exhausted() {
        let row = AttemptRow {
            attempts: 5,
            window_start: fixture_now(),
        };
        assert!(matches!(
            exhausted(Some(row)),
            Ok(Some(SlotAcquisition::Exhausted(AttemptWindow { attempts: 5, .. })))
        ));
    }
}
