//! One TV display connection.
//!
//! The display receives a full board right after connecting. Afterwards the
//! connection's [`TableBoardObserver`] decides when to rebuild; rebuilt
//! boards whose slots and announcements match what the display already shows
//! are not resent, so the 5s reconciliation tick costs no traffic on a quiet
//! day. A `refresh` request from the display always gets a fresh board.
//!
//! Liveness: the server pings every 5s and drops the display after 10s of
//! silence (shortened under test).

use std::sync::Arc;
use std::time::Duration;

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::domain::ports::TableBoardQuery;
use crate::domain::{BoardTrigger, TableBoard, TableBoardObserver};
use crate::inbound::ws::messages::{ClientMessage, ServerMessage};
use crate::inbound::ws::state::WsState;

#[cfg(not(test))]
const PING_EVERY: Duration = Duration::from_secs(5);
#[cfg(test)]
const PING_EVERY: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const IDLE_LIMIT: Duration = Duration::from_secs(10);
#[cfg(test)]
const IDLE_LIMIT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(state: WsState, session: Session, stream: MessageStream) {
    let observer = state.feed.observe(state.refresh);
    let display = Display {
        board: state.board,
        observer,
        session,
        shown: None,
        last_seen: Instant::now(),
    };
    let end = display.serve(stream).await;
    end.finish().await;
}

/// Whether a rebuilt board must reach the display even if unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Always,
    IfChanged,
}

/// Why the connection ended, plus the session if a close frame is owed.
enum Ended {
    Quiet,
    Close(Session, CloseReason),
    Echo(Session, Option<CloseReason>),
}

impl Ended {
    async fn finish(self) {
        let (session, reason) = match self {
            Self::Quiet => return,
            Self::Close(session, reason) => (session, Some(reason)),
            Self::Echo(session, reason) => (session, reason),
        };
        if let Err(error) = session.close(reason).await {
            debug!(%error, "TV display already gone while closing");
        }
    }
}

fn close(code: CloseCode, description: &str) -> CloseReason {
    CloseReason {
        code,
        description: Some(description.to_owned()),
    }
}

struct Display {
    board: Arc<dyn TableBoardQuery>,
    observer: TableBoardObserver,
    session: Session,
    /// Fingerprint of the last board sent.
    shown: Option<String>,
    last_seen: Instant,
}

impl Display {
    async fn serve(mut self, mut stream: MessageStream) -> Ended {
        let mut ping = time::interval(PING_EVERY);
        if let Err(closed) = self.push(Delivery::Always).await {
            return network_lost(&closed);
        }

        loop {
            let step = tokio::select! {
                _ = ping.tick() => self.keep_alive().await,
                trigger = self.observer.changed() => {
                    debug!(?trigger, "TV board trigger");
                    self.push(delivery_for(trigger)).await.map_err(Step::Network)
                }
                message = stream.recv() => self.receive(message).await,
            };
            match step {
                Ok(()) => {}
                Err(Step::Network(closed)) => return network_lost(&closed),
                Err(Step::Idle) => {
                    info!("TV display stopped answering; closing");
                    return Ended::Close(self.session, close(CloseCode::Normal, "heartbeat timeout"));
                }
                Err(Step::ClientClosed(reason)) => {
                    debug!("TV display disconnected");
                    return Ended::Echo(self.session, reason);
                }
                Err(Step::StreamEnded) => return Ended::Quiet,
                Err(Step::Protocol(error)) => {
                    warn!(%error, "TV feed protocol error");
                    return Ended::Close(self.session, close(CloseCode::Protocol, "protocol error"));
                }
                Err(Step::BadRequest) => {
                    return Ended::Close(self.session, close(CloseCode::Policy, "invalid payload"));
                }
            }
        }
    }

    async fn keep_alive(&mut self) -> Result<(), Step> {
        if self.last_seen.elapsed() > IDLE_LIMIT {
            return Err(Step::Idle);
        }
        self.session.ping(b"").await.map_err(Step::Network)
    }

    async fn receive(&mut self, message: Option<Result<Message, ProtocolError>>) -> Result<(), Step> {
        let message = message.ok_or(Step::StreamEnded)?.map_err(Step::Protocol)?;
        self.last_seen = Instant::now();
        match message {
            Message::Ping(payload) => self.session.pong(&payload).await.map_err(Step::Network),
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Refresh) => {
                    self.push(Delivery::Always).await.map_err(Step::Network)
                }
                Err(error) => {
                    warn!(%error, "TV display sent an unreadable message");
                    Err(Step::BadRequest)
                }
            },
            Message::Close(reason) => Err(Step::ClientClosed(reason)),
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                Ok(())
            }
        }
    }

    /// Rebuild the board and send it according to `delivery`.
    ///
    /// A failed rebuild tells the display the board is stale rather than
    /// dropping the connection; the next trigger tries again.
    async fn push(&mut self, delivery: Delivery) -> Result<(), Closed> {
        let board = match self.board.snapshot().await {
            Ok(board) => board,
            Err(error) => {
                warn!(code = ?error.code(), message = error.message(), "TV board rebuild failed");
                self.shown = None;
                return self.send(&ServerMessage::Unavailable {
                    message: "Board temporarily unavailable",
                })
                .await;
            }
        };
        let fingerprint = fingerprint(&board);
        if delivery == Delivery::IfChanged && self.shown.as_ref() == Some(&fingerprint) {
            return Ok(());
        }
        self.send(&ServerMessage::Board(&board)).await?;
        self.shown = Some(fingerprint);
        Ok(())
    }

    async fn send(&mut self, message: &ServerMessage<'_>) -> Result<(), Closed> {
        match serde_json::to_string(message) {
            Ok(body) => self.session.text(body).await,
            Err(error) => {
                warn!(%error, "TV feed message failed to serialise");
                Ok(())
            }
        }
    }
}

fn network_lost(closed: &Closed) -> Ended {
    debug!(error = %closed, "TV display unreachable");
    Ended::Quiet
}

enum Step {
    Network(Closed),
    Idle,
    ClientClosed(Option<CloseReason>),
    StreamEnded,
    Protocol(ProtocolError),
    BadRequest,
}

fn delivery_for(trigger: BoardTrigger) -> Delivery {
    match trigger {
        // A lagged receiver missed events; resend regardless.
        BoardTrigger::Lagged => Delivery::Always,
        BoardTrigger::Pushed(_) | BoardTrigger::Reconcile => Delivery::IfChanged,
    }
}

/// Content identity of a board, ignoring its generation time.
fn fingerprint(board: &TableBoard) -> String {
    serde_json::to_string(&(&board.slots, &board.announcements)).unwrap_or_default()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
