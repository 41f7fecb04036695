//! Workshop domain: value types, aggregates and the services behind the
//! driving ports.
//!
//! Purpose: keep every rule about bikes, repairs, staff and the TV board in
//! one transport-agnostic layer. Inbound adapters call the driving ports in
//! [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: uniform failure payload.
//! - WorkflowStatus / TransitionPolicy: the fixed repair pipeline.
//! - AdminPromotionService: rate-limited promotion secret checks.
//! - TableBoardService / ChangeFeed: TV board snapshots and change events.

pub mod access_token;
pub mod account;
pub mod account_service;
pub mod admin_promotion;
pub mod announcement;
pub mod announcement_service;
pub mod audit;
pub mod availability;
pub mod availability_service;
pub mod bike;
pub mod bike_service;
pub mod board_feed;
pub mod error;
pub mod frame_number;
pub mod frame_number_service;
pub mod ports;
pub mod price_list_service;
pub mod rate_limit;
pub mod repair_type;
pub mod secret;
mod service_support;
pub mod table_board;
pub mod token_authenticator;
pub mod trace_id;
pub mod user;
pub mod work_registration;
pub mod workflow;

pub use self::access_token::{AccessToken, TokenDigest};
pub use self::account::{Account, Permission, Profile, Role, UnknownAccountValue};
pub use self::account_service::AccountService;
pub use self::admin_promotion::{AdminPromotionRepositories, AdminPromotionService};
pub use self::announcement::{ANNOUNCEMENT_MESSAGE_MAX, AnnouncementDraft, TvAnnouncement};
pub use self::announcement_service::AnnouncementService;
pub use self::audit::{AuditLogEntry, AuditOutcome, ClientInfo};
pub use self::availability::{
    AVAILABILITY_NOTES_MAX, Availability, AvailabilityDraft, AvailabilityQuery, AvailabilityStatus,
};
pub use self::availability_service::AvailabilityService;
pub use self::bike::{
    Bike, BikeFilter, BikeId, BikeModel, FRAME_NUMBER_MAX, FrameNumber, FrameNumberError,
    LETTERED_TABLES, NUMBERED_TABLES, TableLabel, UnknownBikeModel, UnknownTable,
};
pub use self::bike_service::{BikeService, BikeServiceSources};
pub use self::board_feed::{
    BoardChange, BoardTrigger, ChangeFeed, DEFAULT_BOARD_REFRESH, TableBoardObserver,
};
pub use self::error::{Error, ErrorCode};
pub use self::frame_number::{
    FrameNumberReading, NOT_FOUND_SENTINEL, OCR_IMAGE_MAX_BYTES, OcrImage,
};
pub use self::frame_number_service::FrameNumberService;
pub use self::price_list_service::PriceListService;
pub use self::rate_limit::{
    AttemptPurpose, AttemptWindow, RateLimitKey, RateLimitPolicy, SlotAcquisition,
};
pub use self::repair_type::{REPAIR_NAME_MAX, RepairType, RepairTypeDraft, RepairTypeId};
pub use self::secret::{PASSWORD_HASH_COST, SecretSource, StoredSecret, hash_password};
pub use self::table_board::{
    BoardInputs, BoardOccupant, BoardRegistration, BoardSlot, TableBoard, TableBoardService,
    TableBoardSources, assemble_slots, days_on_table,
};
pub use self::token_authenticator::TokenAuthenticator;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DISPLAY_NAME_MAX, DisplayName, EmailAddress, UserId, UserValidationError};
pub use self::work_registration::{Approval, WorkRegistration, WorkRegistrationId};
pub use self::workflow::{
    Language, Transition, TransitionPolicy, UnknownWorkflowStatus, WorkflowStatus,
    WorkflowStatusInfo,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use workshop::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
