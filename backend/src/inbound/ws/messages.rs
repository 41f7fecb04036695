//! Wire-level message definitions for the TV feed.
//!
//! The server pushes full board snapshots, or a notice when one could not
//! be built; the single inbound message asks for a snapshot out of turn.

use serde::{Deserialize, Serialize};

use crate::domain::TableBoard;

/// Inbound request payload provided by the display.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Send a fresh snapshot now.
    Refresh,
}

/// Outbound payload.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    /// Complete board, same body as `GET /api/v1/tv/board` plus the tag.
    Board(&'a TableBoard),
    /// The board could not be rebuilt; the display keeps its last picture.
    Unavailable { message: &'a str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_now;
    use serde_json::Value;

    #[test]
    fn board_message_is_tagged_and_flattened() {
        let board = TableBoard {
            slots: Vec::new(),
            announcements: Vec::new(),
            generated_at: fixture_now(),
        };
        let value = serde_json::to_value(ServerMessage::Board(&board)).expect("serialise");
        assert_eq!(value.get("type").and_then(Value::as_str), Some("board"));
        assert!(value.get("slots").is_some_and(Value::is_array));
        assert!(value.get("generatedAt").is_some());
    }

    #[test]
    fn unavailable_notice_is_tagged() {
        let value = serde_json::to_value(ServerMessage::Unavailable { message: "later" })
            .expect("serialise");
        assert_eq!(value, serde_json::json!({ "type": "unavailable", "message": "later" }));
    }

    #[test]
    fn refresh_request_parses() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"refresh"}"#).expect("parse");
        assert_eq!(message, ClientMessage::Refresh);
    }
}
