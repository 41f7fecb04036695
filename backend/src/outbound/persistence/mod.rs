//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL via
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Workshop rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Constraints as errors**: the occupied-table index and the
//!   one-slot-per-day constraint surface as typed port errors.
//!
//! # Example
//!
//! ```ignore
//! use workshop::outbound::persistence::{DbPool, DieselBikeRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/workshop")).await?;
//! let bikes = DieselBikeRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_admin_settings_repository;
mod diesel_announcement_repository;
mod diesel_audit_log_repository;
mod diesel_availability_repository;
mod diesel_bike_repository;
mod diesel_error_mapping;
mod diesel_identity;
mod diesel_rate_limit_repository;
mod diesel_repair_type_repository;
mod diesel_work_registration_repository;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_admin_settings_repository::DieselAdminSettingsRepository;
pub use diesel_announcement_repository::DieselAnnouncementRepository;
pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_availability_repository::DieselAvailabilityRepository;
pub use diesel_bike_repository::DieselBikeRepository;
pub use diesel_identity::DieselIdentityStore;
pub use diesel_rate_limit_repository::DieselRateLimitRepository;
pub use diesel_repair_type_repository::DieselRepairTypeRepository;
pub use diesel_work_registration_repository::DieselWorkRegistrationRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
