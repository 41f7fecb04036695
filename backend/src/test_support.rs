//! Shared test doubles for unit and integration tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Account, DisplayName, EmailAddress, Permission, Profile, Role, UserId};

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used by service tests.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Approved, active account with the given role and permissions.
pub fn staff_account(role: Role, permissions: &[Permission]) -> Account {
    Account {
        profile: Profile {
            user_id: UserId::random(),
            display_name: DisplayName::new("Sanne de Vries").expect("display name"),
            email: EmailAddress::new("sanne@werkplaats.nl").expect("email"),
            active: true,
            approved: true,
        },
        role,
        permissions: permissions.iter().copied().collect::<BTreeSet<_>>(),
    }
}
