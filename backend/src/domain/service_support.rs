//! Helpers shared by the domain services.
//!
//! Port errors are mapped the same way everywhere: an unreachable store is
//! `503`, anything else unexpected is `500`. Port-specific variants that carry
//! domain meaning (occupied tables, duplicate dates) are handled by the
//! owning service before falling back to these.

use tracing::warn;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AdminSettingsRepositoryError,
    AnnouncementRepositoryError, AuditLogRepositoryError, AvailabilityRepositoryError,
    BikeRepositoryError, IdentityError, RateLimitRepositoryError, RepairTypeRepositoryError,
    WorkRegistrationRepositoryError,
};
use crate::domain::{Account, Error, UserId};

macro_rules! map_store_error {
    ($fn_name:ident, $error:ident, $store:literal) => {
        pub(crate) fn $fn_name(error: $error) -> Error {
            warn!(store = $store, kind = error.kind(), %error, "driven port failed");
            match error {
                $error::Connection { message } => {
                    Error::service_unavailable(format!(concat!($store, " unavailable: {}"), message))
                }
                other => Error::internal(format!(concat!($store, " error: {}"), other)),
            }
        }
    };
}

map_store_error!(map_account_error, AccountRepositoryError, "account repository");
map_store_error!(map_bike_error, BikeRepositoryError, "bike repository");
map_store_error!(
    map_registration_error,
    WorkRegistrationRepositoryError,
    "work registration repository"
);
map_store_error!(map_repair_type_error, RepairTypeRepositoryError, "repair type repository");
map_store_error!(map_availability_error, AvailabilityRepositoryError, "availability repository");
map_store_error!(map_announcement_error, AnnouncementRepositoryError, "announcement repository");
map_store_error!(map_audit_error, AuditLogRepositoryError, "audit log");
map_store_error!(map_identity_error, IdentityError, "identity store");
map_store_error!(map_rate_limit_error, RateLimitRepositoryError, "rate limit repository");
map_store_error!(map_settings_error, AdminSettingsRepositoryError, "admin settings");

/// Load the caller's account, requiring it to be approved and active.
///
/// A valid token without a workshop profile is `403`: the identity exists
/// but has not been onboarded.
pub(crate) async fn load_actor<A>(accounts: &A, caller: &UserId) -> Result<Account, Error>
where
    A: AccountRepository + ?Sized,
{
    let account = accounts
        .find(caller)
        .await
        .map_err(map_account_error)?
        .ok_or_else(|| Error::forbidden("no workshop account for this user"))?;
    account.require_enabled()?;
    Ok(account)
}
