//! Frame number recognition from photos.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::{Error, FrameNumber};

/// Sentinel the vision model answers with when no number is visible.
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND";

/// Upper bound on accepted image payloads (decoded bytes).
pub const OCR_IMAGE_MAX_BYTES: usize = 8 * 1024 * 1024;

/// Validated photo ready to be sent to a vision gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrImage {
    media_type: String,
    base64: String,
}

fn invalid_image(message: &str, code: &str) -> Error {
    Error::invalid_request(message.to_owned())
        .with_details(json!({ "field": "imageBase64", "code": code }))
}

impl OcrImage {
    /// Accept plain base64 or a `data:<type>;base64,` URI.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::OcrImage;
    ///
    /// let image = OcrImage::from_base64("data:image/png;base64,aGVsbG8=").unwrap();
    /// assert_eq!(image.media_type(), "image/png");
    /// assert_eq!(image.base64(), "aGVsbG8=");
    /// ```
    pub fn from_base64(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        let (media_type, payload) = match trimmed.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| invalid_image("malformed data URI", "malformed_data_uri"))?;
                let media_type = header
                    .strip_suffix(";base64")
                    .filter(|media| media.starts_with("image/"))
                    .ok_or_else(|| invalid_image("malformed data URI", "malformed_data_uri"))?;
                (media_type.to_owned(), payload)
            }
            None => ("image/jpeg".to_owned(), trimmed),
        };
        if payload.is_empty() {
            return Err(invalid_image("imageBase64 must not be empty", "empty_image"));
        }
        let decoded = STANDARD
            .decode(payload)
            .map_err(|_| invalid_image("imageBase64 is not valid base64", "invalid_base64"))?;
        if decoded.len() > OCR_IMAGE_MAX_BYTES {
            return Err(invalid_image("image is too large", "image_too_large"));
        }
        Ok(Self {
            media_type,
            base64: payload.to_owned(),
        })
    }

    #[must_use]
    pub fn media_type(&self) -> &str {
        self.media_type.as_str()
    }

    #[must_use]
    pub fn base64(&self) -> &str {
        self.base64.as_str()
    }

    /// Image as a `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64)
    }
}

/// Interpreted model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrameNumberReading {
    #[schema(value_type = Option<String>)]
    pub frame_number: Option<FrameNumber>,
    pub raw: String,
}

impl FrameNumberReading {
    /// Interpret the model's raw text.
    ///
    /// Quotes and backticks around the answer are ignored. The sentinel, an
    /// empty answer, or text that is not a plausible frame number all yield
    /// `None`.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::FrameNumberReading;
    ///
    /// assert!(FrameNumberReading::interpret("NOT_FOUND").frame_number.is_none());
    /// let hit = FrameNumberReading::interpret("`wbk 1234`");
    /// assert_eq!(hit.frame_number.unwrap().as_ref(), "WBK1234");
    /// ```
    #[must_use]
    pub fn interpret(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let cleaned = raw
            .trim()
            .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
            .trim();
        let frame_number = if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(NOT_FOUND_SENTINEL)
        {
            None
        } else {
            FrameNumber::new(cleaned).ok()
        };
        Self { frame_number, raw }
    }
}
