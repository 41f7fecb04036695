//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountAdministration, AdminPromotion, Authenticator, AvailabilitySchedule, BikeWorkflow,
    FrameNumberRecognition, PriceList, TableBoardQuery, TvAnnouncements,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use workshop::inbound::http::state::HttpState;
///
/// fn app(state: HttpState) -> App<
///     impl actix_web::dev::ServiceFactory<
///         actix_web::dev::ServiceRequest,
///         Config = (),
///         Response = actix_web::dev::ServiceResponse,
///         Error = actix_web::Error,
///         InitError = (),
///     >,
/// > {
///     App::new().app_data(web::Data::new(state))
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub authenticator: Arc<dyn Authenticator>,
    pub promotion: Arc<dyn AdminPromotion>,
    pub accounts: Arc<dyn AccountAdministration>,
    pub bikes: Arc<dyn BikeWorkflow>,
    pub price_list: Arc<dyn PriceList>,
    pub availability: Arc<dyn AvailabilitySchedule>,
    pub announcements: Arc<dyn TvAnnouncements>,
    pub board: Arc<dyn TableBoardQuery>,
    pub frame_numbers: Arc<dyn FrameNumberRecognition>,
}
