//! Attempt budget for privileged password checks.
//!
//! Each `(purpose, user)` pair owns a fixed window that opens on the first
//! attempt. Within the window at most [`RateLimitPolicy::max_attempts`]
//! slots can be acquired; once the window has elapsed the next attempt opens
//! a fresh one. Acquiring a slot happens before the secret is compared, so
//! concurrent requests cannot overrun the budget.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Privileged operation guarded by the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPurpose {
    /// An admin confirms promoting another account.
    VerifyAdminPassword,
    /// A staff member promotes their own account.
    PromoteToAdmin,
}

impl AttemptPurpose {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerifyAdminPassword => "verify_admin_password",
            Self::PromoteToAdmin => "promote_to_admin",
        }
    }
}

impl fmt::Display for AttemptPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key `<purpose>:<userId>`.
///
/// # Examples
/// ```
/// use workshop::domain::{AttemptPurpose, RateLimitKey, UserId};
///
/// let user = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// let key = RateLimitKey::new(AttemptPurpose::PromoteToAdmin, &user);
/// assert_eq!(key.as_str(), "promote_to_admin:3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    #[must_use]
    pub fn new(purpose: AttemptPurpose, user_id: &UserId) -> Self {
        Self(format!("{purpose}:{user_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attempt counter as stored for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptWindow {
    pub attempts: u32,
    pub window_start: DateTime<Utc>,
}

/// Result of trying to acquire an attempt slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAcquisition {
    /// A slot was consumed; `window.attempts` includes it.
    Acquired(AttemptWindow),
    /// The budget is spent until `window.window_start + window`.
    Exhausted(AttemptWindow),
}

/// Budget shape: attempts per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::hours(1),
        }
    }
}

impl RateLimitPolicy {
    /// Whether a window opened at `window_start` has elapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, window_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > window_start + self.window
    }

    /// Apply one acquisition to the stored state.
    ///
    /// Adapters that cannot run the conditional upsert in storage use this
    /// under their own lock; the SQL adapter encodes the same rules.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use workshop::domain::{RateLimitPolicy, SlotAcquisition};
    ///
    /// let policy = RateLimitPolicy::default();
    /// let SlotAcquisition::Acquired(window) = policy.acquire(None, Utc::now()) else {
    ///     panic!("first attempt must be allowed");
    /// };
    /// assert_eq!(window.attempts, 1);
    /// ```
    #[must_use]
    pub fn acquire(&self, stored: Option<AttemptWindow>, now: DateTime<Utc>) -> SlotAcquisition {
        match stored {
            Some(window) if !self.is_expired(window.window_start, now) => {
                if window.attempts < self.max_attempts {
                    SlotAcquisition::Acquired(AttemptWindow {
                        attempts: window.attempts + 1,
                        window_start: window.window_start,
                    })
                } else {
                    SlotAcquisition::Exhausted(window)
                }
            }
            _ => SlotAcquisition::Acquired(AttemptWindow {
                attempts: 1,
                window_start: now,
            }),
        }
    }

    /// Attempts left after `attempts` have been consumed.
    #[must_use]
    pub fn remaining(&self, attempts: u32) -> u32 {
        self.max_attempts.saturating_sub(attempts)
    }

    /// Whole seconds until a window opened at `window_start` expires.
    #[must_use]
    pub fn retry_after_seconds(&self, window_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (window_start + self.window - now).num_seconds().max(0)
    }
}
