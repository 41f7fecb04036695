//! Password-gated admin promotion.
//!
//! Every attempt first acquires a slot from the [`RateLimitRepository`] and
//! only then compares the supplied password, so the budget holds even under
//! concurrent requests. Outcomes are written to the audit log before the
//! response is produced. A target that already holds the admin role is
//! reported as such only after the password matched; its role row is left
//! untouched.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    ADMIN_PROMOTION_PASSWORD_KEY, AccountRepository, AdminPromotion, AdminSettingsRepository,
    AuditLogRepository, PromotionOutcome, RateLimitRepository,
};
use crate::domain::service_support::{
    load_actor, map_account_error, map_audit_error, map_rate_limit_error, map_settings_error,
};
use crate::domain::{
    Account, AttemptPurpose, AuditLogEntry, AuditOutcome, ClientInfo, Error, RateLimitKey,
    RateLimitPolicy, Role, SecretSource, SlotAcquisition, StoredSecret, UserId,
};

/// Driven ports used by [`AdminPromotionService`].
pub struct AdminPromotionRepositories<L, S, G, A> {
    pub rate_limits: Arc<L>,
    pub settings: Arc<S>,
    pub audit: Arc<G>,
    pub accounts: Arc<A>,
}

/// One promotion attempt after authorisation.
struct Attempt<'a> {
    purpose: AttemptPurpose,
    actor: &'a UserId,
    target: &'a Account,
    password: &'a str,
    client: &'a ClientInfo,
}

/// Service implementing [`AdminPromotion`].
pub struct AdminPromotionService<L, S, G, A> {
    rate_limits: Arc<L>,
    settings: Arc<S>,
    audit: Arc<G>,
    accounts: Arc<A>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    fallback_secret: Option<Zeroizing<String>>,
}

impl<L, S, G, A> AdminPromotionService<L, S, G, A> {
    pub fn new(repositories: AdminPromotionRepositories<L, S, G, A>, clock: Arc<dyn Clock>) -> Self {
        let AdminPromotionRepositories {
            rate_limits,
            settings,
            audit,
            accounts,
        } = repositories;
        Self {
            rate_limits,
            settings,
            audit,
            accounts,
            clock,
            policy: RateLimitPolicy::default(),
            fallback_secret: None,
        }
    }

    /// Secret used when `admin_settings` holds no promotion password.
    #[must_use]
    pub fn with_fallback_secret(mut self, secret: Option<Zeroizing<String>>) -> Self {
        self.fallback_secret = secret.filter(|value| !value.is_empty());
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<L, S, G, A> AdminPromotionService<L, S, G, A>
where
    L: RateLimitRepository,
    S: AdminSettingsRepository,
    G: AuditLogRepository,
    A: AccountRepository,
{
    async fn load_secret(&self) -> Result<StoredSecret, Error> {
        let stored = self
            .settings
            .get(ADMIN_PROMOTION_PASSWORD_KEY)
            .await
            .map_err(map_settings_error)?
            .filter(|value| !value.is_empty());
        let (secret, source) = match (stored, self.fallback_secret.as_ref()) {
            (Some(value), _) => (StoredSecret::from_raw(value), SecretSource::Settings),
            (None, Some(fallback)) => (
                StoredSecret::from_raw(fallback.as_str().to_owned()),
                SecretSource::Environment,
            ),
            (None, None) => {
                error!("admin promotion password is not configured");
                return Err(Error::internal("admin promotion password is not configured"));
            }
        };
        debug!(source = source.as_str(), "loaded admin promotion secret");
        Ok(secret)
    }

    async fn audit(&self, attempt: &Attempt<'_>, outcome: AuditOutcome) -> Result<(), Error> {
        let entry = AuditLogEntry {
            actor: *attempt.actor,
            target: *attempt.target.user_id(),
            purpose: attempt.purpose,
            outcome,
            client: attempt.client.clone(),
            created_at: self.clock.utc(),
        };
        self.audit.record(&entry).await.map_err(map_audit_error)
    }

    async fn run(&self, attempt: Attempt<'_>) -> Result<PromotionOutcome, Error> {
        let target_id = attempt.target.user_id();
        if attempt.password.is_empty() {
            return Err(Error::invalid_request("password is required")
                .with_details(json!({ "field": "password", "code": "missing_password" })));
        }

        let key = RateLimitKey::new(attempt.purpose, attempt.actor);
        let now = self.clock.utc();
        let window = match self
            .rate_limits
            .try_acquire(&key, self.policy, now)
            .await
            .map_err(map_rate_limit_error)?
        {
            SlotAcquisition::Acquired(window) => window,
            SlotAcquisition::Exhausted(window) => {
                let retry_after = self.policy.retry_after_seconds(window.window_start, now);
                warn!(%key, retry_after, "admin promotion attempt budget exhausted");
                self.audit(&attempt, AuditOutcome::RateLimited).await?;
                return Err(Error::too_many_requests(
                    "too many attempts, try again later",
                )
                .with_details(json!({
                    "remainingAttempts": 0,
                    "retryAfterSeconds": retry_after,
                })));
            }
        };

        let secret = self.load_secret().await?;
        if !secret.verify(attempt.password)? {
            let remaining = self.policy.remaining(window.attempts);
            warn!(%key, attempts = window.attempts, remaining, "admin promotion password rejected");
            self.audit(&attempt, AuditOutcome::Failure).await?;
            return Err(Error::unauthorized("invalid admin password")
                .with_details(json!({ "remainingAttempts": remaining })));
        }

        self.rate_limits
            .reset(&key)
            .await
            .map_err(map_rate_limit_error)?;
        self.audit(&attempt, AuditOutcome::Success).await?;
        if attempt.target.is_admin() {
            info!(purpose = %attempt.purpose, target = %target_id, "target already holds the admin role");
            return Ok(PromotionOutcome::AlreadyAdmin);
        }
        self.accounts
            .set_role(target_id, Role::Admin)
            .await
            .map_err(map_account_error)?;
        info!(purpose = %attempt.purpose, actor = %attempt.actor, target = %target_id, "account promoted to admin");
        Ok(PromotionOutcome::Promoted)
    }
}

#[async_trait]
impl<L, S, G, A> AdminPromotion for AdminPromotionService<L, S, G, A>
where
    L: RateLimitRepository,
    S: AdminSettingsRepository,
    G: AuditLogRepository,
    A: AccountRepository,
{
    async fn verify_admin_password(
        &self,
        caller: &UserId,
        target: &UserId,
        password: &str,
        client: &ClientInfo,
    ) -> Result<PromotionOutcome, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        actor.require_admin()?;
        let target = self
            .accounts
            .find(target)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("target account not found"))?;
        self.run(Attempt {
            purpose: AttemptPurpose::VerifyAdminPassword,
            actor: caller,
            target: &target,
            password,
            client,
        })
        .await
    }

    async fn promote_self(
        &self,
        caller: &UserId,
        password: &str,
        client: &ClientInfo,
    ) -> Result<PromotionOutcome, Error> {
        let actor = load_actor(self.accounts.as_ref(), caller).await?;
        self.run(Attempt {
            purpose: AttemptPurpose::PromoteToAdmin,
            actor: caller,
            target: &actor,
            password,
            client,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccountRepository, MockAdminSettingsRepository, MockAuditLogRepository,
        MockRateLimitRepository,
    };
    use crate::domain::{AttemptWindow, ErrorCode, Permission, hash_password};
    use crate::test_support::{MutableClock, fixture_now, staff_account};
    use chrono::Duration;
    use mockall::predicate::eq;
    use rstest::rstest;

    type Service = AdminPromotionService<
        MockRateLimitRepository,
        MockAdminSettingsRepository,
        MockAuditLogRepository,
        MockAccountRepository,
    >;

    struct Mocks {
        rate_limits: MockRateLimitRepository,
        settings: MockAdminSettingsRepository,
        audit: MockAuditLogRepository,
        accounts: MockAccountRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                rate_limits: MockRateLimitRepository::new(),
                settings: MockAdminSettingsRepository::new(),
                audit: MockAuditLogRepository::new(),
                accounts: MockAccountRepository::new(),
            }
        }

        fn caller(&mut self, account: Account) {
            self.accounts
                .expect_find()
                .with(eq(*account.user_id()))
                .returning(move |_| Ok(Some(account.clone())));
        }

        fn secret(&mut self, value: &'static str) {
            self.settings
                .expect_get()
                .withf(|key| key == ADMIN_PROMOTION_PASSWORD_KEY)
                .returning(move |_| Ok(Some(value.to_owned())));
        }

        fn acquire(&mut self, attempts: u32) {
            self.rate_limits.expect_try_acquire().returning(move |_, _, now| {
                Ok(SlotAcquisition::Acquired(AttemptWindow {
                    attempts,
                    window_start: now,
                }))
            });
        }

        fn expect_audit(&mut self, outcome: AuditOutcome) {
            self.audit
                .expect_record()
                .withf(move |entry| entry.outcome == outcome)
                .times(1)
                .returning(|_| Ok(()));
        }

        fn into_service(self) -> Service {
            AdminPromotionService::new(
                AdminPromotionRepositories {
                    rate_limits: Arc::new(self.rate_limits),
                    settings: Arc::new(self.settings),
                    audit: Arc::new(self.audit),
                    accounts: Arc::new(self.accounts),
                },
                Arc::new(MutableClock::new(fixture_now())),
            )
        }
    }

    #[tokio::test]
    async fn correct_password_promotes_and_resets_budget() {
        let caller = staff_account(Role::Monteur, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.secret("fietsenmaker");
        mocks.acquire(3);
        mocks.rate_limits.expect_reset().times(1).returning(|_| Ok(()));
        mocks.expect_audit(AuditOutcome::Success);
        mocks
            .accounts
            .expect_set_role()
            .with(eq(caller_id), eq(Role::Admin))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = mocks
            .into_service()
            .promote_self(&caller_id, "fietsenmaker", &ClientInfo::default())
            .await
            .expect("promotion succeeds");
        assert_eq!(outcome, PromotionOutcome::Promoted);
    }

    #[tokio::test]
    async fn wrong_password_reports_remaining_attempts() {
        let caller = staff_account(Role::Foh, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.secret("fietsenmaker");
        mocks.acquire(2);
        mocks.rate_limits.expect_reset().never();
        mocks.accounts.expect_set_role().never();
        mocks.expect_audit(AuditOutcome::Failure);

        let error = mocks
            .into_service()
            .promote_self(&caller_id, "fietsenmakker", &ClientInfo::default())
            .await
            .expect_err("wrong password");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.details(), Some(&json!({ "remainingAttempts": 3 })));
    }

    #[tokio::test]
    async fn exhausted_budget_skips_secret_comparison() {
        let caller = staff_account(Role::Monteur, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.settings.expect_get().never();
        mocks.rate_limits.expect_try_acquire().returning(|_, _, now| {
            Ok(SlotAcquisition::Exhausted(AttemptWindow {
                attempts: 5,
                window_start: now - Duration::minutes(45),
            }))
        });
        mocks.expect_audit(AuditOutcome::RateLimited);

        let error = mocks
            .into_service()
            .promote_self(&caller_id, "fietsenmaker", &ClientInfo::default())
            .await
            .expect_err("rate limited");
        assert_eq!(error.code(), ErrorCode::TooManyRequests);
        assert_eq!(
            error.details(),
            Some(&json!({ "remainingAttempts": 0, "retryAfterSeconds": 900 }))
        );
    }

    #[tokio::test]
    async fn already_admin_is_reported_after_a_matching_password() {
        let caller = staff_account(Role::Admin, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.secret("fietsenmaker");
        mocks.acquire(1);
        mocks.rate_limits.expect_reset().times(1).returning(|_| Ok(()));
        mocks.expect_audit(AuditOutcome::Success);
        mocks.accounts.expect_set_role().never();

        let outcome = mocks
            .into_service()
            .promote_self(&caller_id, "fietsenmaker", &ClientInfo::default())
            .await
            .expect("already admin");
        assert_eq!(outcome, PromotionOutcome::AlreadyAdmin);
    }

    #[tokio::test]
    async fn wrong_password_for_admin_target_is_rejected_and_audited() {
        let admin = staff_account(Role::Admin, &[]);
        let admin_id = *admin.user_id();
        let target = staff_account(Role::Admin, &[]);
        let target_id = *target.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(admin);
        mocks.caller(target);
        mocks.secret("fietsenmaker");
        mocks.acquire(1);
        mocks.rate_limits.expect_reset().never();
        mocks.accounts.expect_set_role().never();
        mocks.expect_audit(AuditOutcome::Failure);

        let error = mocks
            .into_service()
            .verify_admin_password(&admin_id, &target_id, "WRONG", &ClientInfo::default())
            .await
            .expect_err("wrong password");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.details(), Some(&json!({ "remainingAttempts": 4 })));
    }

    #[tokio::test]
    async fn empty_password_is_rejected_before_acquiring() {
        let caller = staff_account(Role::Monteur, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.rate_limits.expect_try_acquire().never();

        let error = mocks
            .into_service()
            .promote_self(&caller_id, "", &ClientInfo::default())
            .await
            .expect_err("empty password");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn missing_secret_is_internal_error() {
        let caller = staff_account(Role::Monteur, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.settings.expect_get().returning(|_| Ok(None));
        mocks.acquire(1);

        let error = mocks
            .into_service()
            .promote_self(&caller_id, "fietsenmaker", &ClientInfo::default())
            .await
            .expect_err("no secret configured");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case("fietsenmaker", true)]
    #[case("werkplaats", false)]
    #[tokio::test]
    async fn environment_fallback_is_used_when_settings_are_empty(
        #[case] supplied: &str,
        #[case] promoted: bool,
    ) {
        let caller = staff_account(Role::Monteur, &[]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.settings.expect_get().returning(|_| Ok(None));
        mocks.acquire(1);
        mocks.rate_limits.expect_reset().returning(|_| Ok(()));
        mocks.audit.expect_record().returning(|_| Ok(()));
        mocks.accounts.expect_set_role().returning(|_, _| Ok(()));

        let service = mocks
            .into_service()
            .with_fallback_secret(Some(Zeroizing::new("fietsenmaker".to_owned())));
        let result = service
            .promote_self(&caller_id, supplied, &ClientInfo::default())
            .await;
        assert_eq!(result.is_ok(), promoted);
    }

    #[tokio::test]
    async fn bcrypt_secret_in_settings_is_honoured() {
        let caller = staff_account(Role::Monteur, &[]);
        let caller_id = *caller.user_id();
        let hash = hash_password("fietsenmaker", 4).expect("hash");
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks
            .settings
            .expect_get()
            .returning(move |_| Ok(Some(hash.clone())));
        mocks.acquire(1);
        mocks.rate_limits.expect_reset().returning(|_| Ok(()));
        mocks.expect_audit(AuditOutcome::Success);
        mocks.accounts.expect_set_role().returning(|_, _| Ok(()));

        let outcome = mocks
            .into_service()
            .promote_self(&caller_id, "fietsenmaker", &ClientInfo::default())
            .await
            .expect("bcrypt match");
        assert_eq!(outcome, PromotionOutcome::Promoted);
    }

    #[tokio::test]
    async fn verification_requires_admin_caller() {
        let caller = staff_account(Role::Monteur, &[Permission::CallStatus]);
        let caller_id = *caller.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(caller);
        mocks.rate_limits.expect_try_acquire().never();

        let error = mocks
            .into_service()
            .verify_admin_password(
                &caller_id,
                &UserId::random(),
                "fietsenmaker",
                &ClientInfo::default(),
            )
            .await
            .expect_err("not an admin");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn verification_promotes_target_and_keys_budget_on_caller() {
        let admin = staff_account(Role::Admin, &[]);
        let admin_id = *admin.user_id();
        let target = staff_account(Role::Foh, &[]);
        let target_id = *target.user_id();
        let expected_key = RateLimitKey::new(AttemptPurpose::VerifyAdminPassword, &admin_id);
        let mut mocks = Mocks::new();
        mocks.caller(admin);
        mocks.caller(target);
        mocks.secret("fietsenmaker");
        mocks
            .rate_limits
            .expect_try_acquire()
            .withf(move |key, _, _| *key == expected_key)
            .returning(|_, _, now| {
                Ok(SlotAcquisition::Acquired(AttemptWindow {
                    attempts: 1,
                    window_start: now,
                }))
            });
        mocks.rate_limits.expect_reset().returning(|_| Ok(()));
        mocks
            .audit
            .expect_record()
            .withf(move |entry| {
                entry.target == target_id && entry.purpose == AttemptPurpose::VerifyAdminPassword
            })
            .returning(|_| Ok(()));
        mocks
            .accounts
            .expect_set_role()
            .with(eq(target_id), eq(Role::Admin))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = mocks
            .into_service()
            .verify_admin_password(&admin_id, &target_id, "fietsenmaker", &ClientInfo::default())
            .await
            .expect("verified");
        assert_eq!(outcome, PromotionOutcome::Promoted);
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let admin = staff_account(Role::Admin, &[]);
        let admin_id = *admin.user_id();
        let mut mocks = Mocks::new();
        mocks.caller(admin);
        mocks
            .accounts
            .expect_find()
            .withf(move |id| *id != admin_id)
            .returning(|_| Ok(None));

        let error = mocks
            .into_service()
            .verify_admin_password(&admin_id, &UserId::random(), "x", &ClientInfo::default())
            .await
            .expect_err("missing target");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
