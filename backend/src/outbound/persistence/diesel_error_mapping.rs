//! Conversions from pool and Diesel failures into driven-port errors.
//!
//! Every repository port error has `Connection` and `Query` variants; the
//! [`store_error_conversions!`] invocation below gives each of them
//! `From<PoolError>` and `From<DieselError>` so adapters can write
//! `.map_err(BikeRepositoryError::from)`. Database detail goes to the debug
//! log only.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    AccountRepositoryError, AdminSettingsRepositoryError, AnnouncementRepositoryError,
    AuditLogRepositoryError, AvailabilityRepositoryError, BikeRepositoryError, IdentityError,
    RateLimitRepositoryError, RepairTypeRepositoryError, WorkRegistrationRepositoryError,
};

use super::pool::PoolError;

/// Broad classification shared by every port error.
enum Failure {
    Connection(String),
    Query(&'static str),
}

fn classify_pool(error: PoolError) -> Failure {
    match error {
        PoolError::Checkout { message }
        | PoolError::Build { message }
        | PoolError::Migration { message } => Failure::Connection(message),
    }
}

fn classify_diesel(error: &DieselError) -> Failure {
    if let DieselError::DatabaseError(kind, info) = error {
        debug!(?kind, message = info.message(), constraint = ?info.constraint_name(), "query failed");
    } else {
        debug!(%error, "query failed");
    }
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            Failure::Connection("database connection lost".to_owned())
        }
        DieselError::NotFound => Failure::Query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            Failure::Query("concurrent update, retry the request")
        }
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            Failure::Query("row encoding mismatch")
        }
        _ => Failure::Query("database error"),
    }
}

macro_rules! store_error_conversions {
    ($($error:ident),+ $(,)?) => {
        $(
            impl From<PoolError> for $error {
                fn from(error: PoolError) -> Self {
                    classify_pool(error).into()
                }
            }

            impl From<DieselError> for $error {
                fn from(error: DieselError) -> Self {
                    classify_diesel(&error).into()
                }
            }

            impl From<Failure> for $error {
                fn from(failure: Failure) -> Self {
                    match failure {
                        Failure::Connection(message) => Self::connection(message),
                        Failure::Query(message) => Self::query(message),
                    }
                }
            }
        )+
    };
}

store_error_conversions!(
    AccountRepositoryError,
    AdminSettingsRepositoryError,
    AnnouncementRepositoryError,
    AuditLogRepositoryError,
    AvailabilityRepositoryError,
    BikeRepositoryError,
    IdentityError,
    RateLimitRepositoryError,
    RepairTypeRepositoryError,
    WorkRegistrationRepositoryError,
);

/// Whether `error` is a unique violation of `constraint`.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

/// Message for rows that no longer decode into domain values.
pub(crate) fn corrupt_row(table: &str, error: impl std::fmt::Display) -> String {
    format!("{table}: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn pool_failures_are_connection_errors() {
        let error = BikeRepositoryError::from(PoolError::checkout("timed out"));
        assert!(matches!(error, BikeRepositoryError::Connection { message } if message == "timed out"));
    }

    #[rstest]
    #[case(DieselError::NotFound, "record not found")]
    #[case(DieselError::RollbackTransaction, "database error")]
    fn query_failures_keep_details_out_of_the_message(
        #[case] error: DieselError,
        #[case] expected: &str,
    ) {
        let mapped = AccountRepositoryError::from(error);
        assert!(matches!(mapped, AccountRepositoryError::Query { message } if message == expected));
    }
}
