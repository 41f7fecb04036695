//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`IdentityResolver`], [`FrameNumberReader`])
//! are implemented by outbound adapters. Driving ports are implemented by
//! domain services and consumed by the inbound HTTP and WebSocket adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_administration;
mod account_repository;
mod admin_promotion;
mod admin_settings_repository;
mod announcement_repository;
mod audit_log_repository;
mod authenticator;
mod availability_repository;
mod availability_schedule;
mod bike_repository;
mod bike_workflow;
mod frame_number_reader;
mod frame_number_recognition;
mod identity;
mod price_list;
mod rate_limit_repository;
mod repair_type_repository;
mod table_board_query;
mod tv_announcements;
mod work_registration_repository;

#[cfg(test)]
pub use account_administration::MockAccountAdministration;
pub use account_administration::AccountAdministration;
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountFlags, AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use admin_promotion::MockAdminPromotion;
pub use admin_promotion::{AdminPromotion, PromotionOutcome};
#[cfg(test)]
pub use admin_settings_repository::MockAdminSettingsRepository;
pub use admin_settings_repository::{
    ADMIN_PROMOTION_PASSWORD_KEY, AdminSettingsRepository, AdminSettingsRepositoryError,
};
#[cfg(test)]
pub use announcement_repository::MockAnnouncementRepository;
pub use announcement_repository::{AnnouncementRepository, AnnouncementRepositoryError};
#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
pub use audit_log_repository::{AuditLogRepository, AuditLogRepositoryError};
#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::Authenticator;
#[cfg(test)]
pub use availability_repository::MockAvailabilityRepository;
pub use availability_repository::{AvailabilityRepository, AvailabilityRepositoryError};
#[cfg(test)]
pub use availability_schedule::MockAvailabilitySchedule;
pub use availability_schedule::AvailabilitySchedule;
#[cfg(test)]
pub use bike_repository::MockBikeRepository;
pub use bike_repository::{BikeRepository, BikeRepositoryError};
#[cfg(test)]
pub use bike_workflow::MockBikeWorkflow;
pub use bike_workflow::{BikeIntake, BikeWorkflow};
#[cfg(test)]
pub use frame_number_reader::MockFrameNumberReader;
pub use frame_number_reader::{
    FrameNumberReader, FrameNumberReaderError, UnconfiguredFrameNumberReader,
};
#[cfg(test)]
pub use frame_number_recognition::MockFrameNumberRecognition;
pub use frame_number_recognition::FrameNumberRecognition;
#[cfg(test)]
pub use identity::{MockIdentityDirectory, MockIdentityResolver};
pub use identity::{IdentityDirectory, IdentityError, IdentityResolver};
#[cfg(test)]
pub use price_list::MockPriceList;
pub use price_list::PriceList;
#[cfg(test)]
pub use rate_limit_repository::MockRateLimitRepository;
pub use rate_limit_repository::{RateLimitRepository, RateLimitRepositoryError};
#[cfg(test)]
pub use repair_type_repository::MockRepairTypeRepository;
pub use repair_type_repository::{RepairTypeRepository, RepairTypeRepositoryError};
#[cfg(test)]
pub use table_board_query::MockTableBoardQuery;
pub use table_board_query::TableBoardQuery;
#[cfg(test)]
pub use tv_announcements::MockTvAnnouncements;
pub use tv_announcements::TvAnnouncements;
#[cfg(test)]
pub use work_registration_repository::MockWorkRegistrationRepository;
pub use work_registration_repository::{
    WorkRegistrationRepository, WorkRegistrationRepositoryError,
};
