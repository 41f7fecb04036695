//! Mechanic availability scheduling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    AccountRepository, AvailabilityRepository, AvailabilityRepositoryError, AvailabilitySchedule,
};
use crate::domain::service_support::{load_actor, map_availability_error};
use crate::domain::{
    Availability, AvailabilityDraft, AvailabilityQuery, AvailabilityStatus, Error, Permission,
    UserId,
};

/// Service implementing [`AvailabilitySchedule`].
pub struct AvailabilityService<V, A> {
    slots: Arc<V>,
    accounts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<V, A> AvailabilityService<V, A> {
    pub fn new(slots: Arc<V>, accounts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots,
            accounts,
            clock,
        }
    }
}

#[async_trait]
impl<V, A> AvailabilitySchedule for AvailabilityService<V, A>
where
    V: AvailabilityRepository,
    A: AccountRepository,
{
    async fn submit(
        &self,
        caller: &UserId,
        draft: AvailabilityDraft,
    ) -> Result<Availability, Error> {
        load_actor(self.accounts.as_ref(), caller).await?;
        let draft = draft.validate()?;
        let slot = Availability {
            id: Uuid::new_v4(),
            user_id: *caller,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            notes: draft.notes,
            status: AvailabilityStatus::Pending,
            created_at: self.clock.utc(),
        };
        self.slots.insert(&slot).await.map_err(|error| match error {
            AvailabilityRepositoryError::DateTaken { date } => {
                Error::conflict(format!("you already registered availability on {date}"))
                    .with_details(json!({ "date": date, "code": "duplicate_availability" }))
            }
            other => map_availability_error(other),
        })?;
        info!(%caller, date = %slot.date, "availability submitted");
        Ok(slot)
    }

    async fn list(
        &self,
        caller: &UserId,
        from: NaiveDate,
        to: NaiveDate,
        everyone: bool,
    ) -> Result<Vec<Availability>, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        if to < from {
            return Err(Error::invalid_request("`to` must not be before `from`")
                .with_details(json!({ "field": "to", "code": "invalid_range" })));
        }
        let user_id = if everyone {
            actor.require_permission(Permission::Availability)?;
            None
        } else {
            Some(*caller)
        };
        self.slots
            .list(&AvailabilityQuery { from, to, user_id })
            .await
            .map_err(map_availability_error)
    }

    async fn decide(
        &self,
        caller: &UserId,
        id: Uuid,
        approved: bool,
    ) -> Result<Availability, Error> {
        load_actor(self.accounts.as_ref(), caller)
            .await?
            .require_permission(Permission::Availability)?;
        let status = if approved {
            AvailabilityStatus::Approved
        } else {
            AvailabilityStatus::Rejected
        };
        let slot = self
            .slots
            .set_status(id, status)
            .await
            .map_err(map_availability_error)?
            .ok_or_else(|| Error::not_found(format!("availability {id} not found")))?;
        info!(%caller, availability = %id, status = status.as_str(), "availability decided");
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAccountRepository, MockAvailabilityRepository};
    use crate::domain::{Account, ErrorCode, Role};
    use crate::test_support::{MutableClock, fixture_now, staff_account};
    use chrono::NaiveTime;

    fn service(
        slots: MockAvailabilityRepository,
        actor: &Account,
    ) -> AvailabilityService<MockAvailabilityRepository, MockAccountRepository> {
        let known = actor.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find()
            .returning(move |_| Ok(Some(known.clone())));
        AvailabilityService::new(
            Arc::new(slots),
            Arc::new(accounts),
            Arc::new(MutableClock::new(fixture_now())),
        )
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date")
    }

    fn draft() -> AvailabilityDraft {
        AvailabilityDraft {
            date: date(6),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            end_time: NaiveTime::from_hms_opt(13, 0, 0).expect("time"),
            notes: None,
        }
    }

    #[tokio::test]
    async fn duplicate_date_is_a_conflict() {
        let actor = staff_account(Role::Monteur, &[]);
        let mut slots = MockAvailabilityRepository::new();
        slots
            .expect_insert()
            .returning(|_| Err(AvailabilityRepositoryError::date_taken("2024-05-06")));

        let error = service(slots, &actor)
            .submit(actor.user_id(), draft())
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn new_slots_are_pending_and_owned_by_the_caller() {
        let actor = staff_account(Role::Monteur, &[]);
        let mut slots = MockAvailabilityRepository::new();
        slots.expect_insert().times(1).returning(|_| Ok(()));

        let slot = service(slots, &actor)
            .submit(actor.user_id(), draft())
            .await
            .expect("submitted");
        assert_eq!(slot.status, AvailabilityStatus::Pending);
        assert_eq!(slot.user_id, *actor.user_id());
    }

    #[tokio::test]
    async fn own_listing_is_scoped_to_the_caller() {
        let actor = staff_account(Role::Monteur, &[]);
        let caller = *actor.user_id();
        let mut slots = MockAvailabilityRepository::new();
        slots
            .expect_list()
            .withf(move |query| query.user_id == Some(caller))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        service(slots, &actor)
            .list(actor.user_id(), date(1), date(31), false)
            .await
            .expect("listed");
    }

    #[tokio::test]
    async fn team_listing_requires_permission() {
        let actor = staff_account(Role::Monteur, &[]);
        let mut slots = MockAvailabilityRepository::new();
        slots.expect_list().never();

        let error = service(slots, &actor)
            .list(actor.user_id(), date(1), date(31), true)
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn planners_decide_slots() {
        let actor = staff_account(Role::Foh, &[Permission::Availability]);
        let mut slots = MockAvailabilityRepository::new();
        slots
            .expect_set_status()
            .withf(|_, status| *status == AvailabilityStatus::Rejected)
            .returning(|_, _| Ok(None));

        let error = service(slots, &actor)
            .decide(actor.user_id(), Uuid::new_v4(), false)
            .await
            .expect_err("unknown slot");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
