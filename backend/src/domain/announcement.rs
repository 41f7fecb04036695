//! Messages shown on the workshop TV.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Error;

/// Maximum announcement length.
pub const ANNOUNCEMENT_MESSAGE_MAX: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TvAnnouncement {
    pub id: Uuid,
    pub message: String,
    pub background_color: String,
    pub text_color: String,
    pub icon: Option<String>,
    pub fullscreen: bool,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TvAnnouncement {
    /// Whether the announcement should currently be on screen.
    #[must_use]
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expires| expires > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementDraft {
    pub message: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_text")]
    pub text_color: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_background() -> String {
    "#1E3A8A".to_owned()
}

fn default_text() -> String {
    "#FFFFFF".to_owned()
}

static HEX_COLOUR_RE: OnceLock<Regex> = OnceLock::new();

fn hex_colour_regex() -> &'static Regex {
    HEX_COLOUR_RE.get_or_init(|| {
        Regex::new("^#[0-9A-Fa-f]{6}$")
            .unwrap_or_else(|error| panic!("colour regex failed to compile: {error}"))
    })
}

impl AnnouncementDraft {
    /// Validate message and colours; colours are upper-cased.
    pub fn validate(mut self, now: DateTime<Utc>) -> Result<Self, Error> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(Error::invalid_request("message must not be empty")
                .with_details(json!({ "field": "message", "code": "empty_message" })));
        }
        if message.chars().count() > ANNOUNCEMENT_MESSAGE_MAX {
            return Err(Error::invalid_request(format!(
                "message must be at most {ANNOUNCEMENT_MESSAGE_MAX} characters"
            ))
            .with_details(json!({ "field": "message", "code": "message_too_long" })));
        }
        self.message = message.to_owned();
        for (field, colour) in [
            ("backgroundColor", &mut self.background_color),
            ("textColor", &mut self.text_color),
        ] {
            if !hex_colour_regex().is_match(colour) {
                return Err(Error::invalid_request(format!(
                    "{field} must be a #RRGGBB colour"
                ))
                .with_details(json!({ "field": field, "code": "invalid_colour" })));
            }
            *colour = colour.to_ascii_uppercase();
        }
        if self.expires_at.is_some_and(|expires| expires <= now) {
            return Err(Error::invalid_request("expiry must be in the future")
                .with_details(json!({ "field": "expiresAt", "code": "expired" })));
        }
        self.icon = self
            .icon
            .map(|icon| icon.trim().to_owned())
            .filter(|icon| !icon.is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn draft(background: &str) -> AnnouncementDraft {
        AnnouncementDraft {
            message: " Koffie staat klaar ".to_owned(),
            background_color: background.to_owned(),
            text_color: "#ffffff".to_owned(),
            icon: None,
            fullscreen: false,
            expires_at: None,
        }
    }

    #[rstest]
    #[case("#00ff00", true)]
    #[case("00ff00", false)]
    #[case("#00ff0", false)]
    #[case("#gg0000", false)]
    #[case("#00ff00ff", false)]
    #[case("#00ff00\n", false)]
    fn colours_must_be_hex(#[case] background: &str, #[case] ok: bool) {
        assert_eq!(draft(background).validate(Utc::now()).is_ok(), ok);
    }

    #[test]
    fn normalises_message_and_colours() {
        let valid = draft("#00ff00").validate(Utc::now()).expect("valid");
        assert_eq!(valid.message, "Koffie staat klaar");
        assert_eq!(valid.text_color, "#FFFFFF");
    }

    #[test]
    fn visibility_honours_expiry() {
        let now = Utc::now();
        let mut announcement = TvAnnouncement {
            id: Uuid::new_v4(),
            message: "Pauze".to_owned(),
            background_color: "#000000".to_owned(),
            text_color: "#FFFFFF".to_owned(),
            icon: None,
            fullscreen: false,
            active: true,
            expires_at: Some(now + Duration::minutes(5)),
            created_at: now,
        };
        assert!(announcement.is_visible(now));
        assert!(!announcement.is_visible(now + Duration::minutes(6)));
        announcement.active = false;
        assert!(!announcement.is_visible(now));
    }
}
