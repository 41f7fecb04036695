//! WebSocket inbound adapter pushing TV board snapshots.
//!
//! Responsibilities:
//! - upgrade `/ws/tv` requests and hand the socket to a session task
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{debug, error};

mod session;

pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws/tv` endpoint.
///
/// The feed is public like `GET /api/v1/tv/board`.
#[get("/ws/tv")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        error
    })?;
    debug!(peer = ?req.peer_addr(), "TV feed connected");

    let state = state.get_ref().clone();
    actix_web::rt::spawn(session::handle_ws_session(state, session, messages));
    Ok(response)
}
