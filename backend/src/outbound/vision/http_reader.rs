//! Reqwest-backed frame number reader.
//!
//! Sends the intake photo to a vision model and returns its raw answer.
//! Interpreting the answer is the domain's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{
    ChatRequestDto, ChatResponseDto, ContentPartDto, ImageUrlDto, MessageDto,
};
use crate::domain::ports::{FrameNumberReader, FrameNumberReaderError};
use crate::domain::{NOT_FOUND_SENTINEL, OcrImage};

const SYSTEM_PROMPT: &str = "You read bicycle frame numbers from photos. \
The frame number is engraved or stamped on the frame, usually under the \
bottom bracket or on the rear dropout. Answer with the frame number only, \
without explanation. If no frame number is legible, answer NOT_FOUND.";
const USER_PROMPT: &str = "What is the frame number on this bicycle?";
const MAX_ANSWER_TOKENS: u32 = 64;

/// Connection settings for the vision gateway.
pub struct VisionGatewayConfig {
    /// Base URL; `chat/completions` is resolved against it.
    pub base_url: Url,
    pub api_key: Zeroizing<String>,
    pub model: String,
    pub timeout: Duration,
}

/// [`FrameNumberReader`] calling an OpenAI-compatible gateway.
pub struct HttpFrameNumberReader {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    model: String,
}

impl HttpFrameNumberReader {
    /// Build a reader with a client bound to the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint URL cannot be derived from the
    /// base URL or the reqwest client cannot be constructed.
    pub fn new(config: VisionGatewayConfig) -> Result<Self, FrameNumberReaderError> {
        let endpoint = chat_endpoint(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| FrameNumberReaderError::unavailable(error.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            model: config.model,
        })
    }
}

fn chat_endpoint(base_url: &Url) -> Result<Url, FrameNumberReaderError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
        .map_err(|error| FrameNumberReaderError::unavailable(format!("invalid gateway url: {error}")))
}

fn build_request<'a>(model: &'a str, data_uri: String) -> ChatRequestDto<'a> {
    ChatRequestDto {
        model,
        messages: vec![
            MessageDto {
                role: "system",
                content: vec![ContentPartDto::Text {
                    text: SYSTEM_PROMPT,
                }],
            },
            MessageDto {
                role: "user",
                content: vec![
                    ContentPartDto::Text { text: USER_PROMPT },
                    ContentPartDto::ImageUrl {
                        image_url: ImageUrlDto { url: data_uri },
                    },
                ],
            },
        ],
        max_tokens: MAX_ANSWER_TOKENS,
        temperature: 0.0,
    }
}

#[async_trait]
impl FrameNumberReader for HttpFrameNumberReader {
    async fn read(&self, image: &OcrImage) -> Result<String, FrameNumberReaderError> {
        let request = build_request(&self.model, image.data_uri());
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_answer(body.as_ref())
    }
}

fn parse_answer(body: &[u8]) -> Result<String, FrameNumberReaderError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        FrameNumberReaderError::invalid_response(format!("invalid JSON payload: {error}"))
    })?;
    let answer = decoded
        .into_answer()
        .map_err(FrameNumberReaderError::invalid_response)?;
    debug!(
        not_found = answer.trim().eq_ignore_ascii_case(NOT_FOUND_SENTINEL),
        "vision gateway answered"
    );
    Ok(answer)
}

fn map_transport_error(error: reqwest::Error) -> FrameNumberReaderError {
    if error.is_timeout() {
        FrameNumberReaderError::unavailable("request timed out")
    } else {
        FrameNumberReaderError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> FrameNumberReaderError {
    let preview = body_preview(body);
    if preview.is_empty() {
        FrameNumberReaderError::unavailable(format!("status {}", status.as_u16()))
    } else {
        FrameNumberReaderError::unavailable(format!("status {}: {preview}", status.as_u16()))
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case("https://gateway.example/v1", "https://gateway.example/v1/chat/completions")]
    #[case("https://gateway.example/v1/", "https://gateway.example/v1/chat/completions")]
    fn endpoint_keeps_the_base_path(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("url");
        assert_eq!(chat_endpoint(&base).expect("endpoint").as_str(), expected);
    }

    #[test]
    fn request_carries_the_image_as_data_uri() {
        let request = build_request("vision-small", "data:image/jpeg;base64,AAAA".to_owned());
        let json = serde_json::to_value(&request).expect("serialises");

        assert_eq!(json.get("model").and_then(Value::as_str), Some("vision-small"));
        assert_eq!(
            json.pointer("/messages/1/content/1/type").and_then(Value::as_str),
            Some("image_url")
        );
        assert_eq!(
            json.pointer("/messages/1/content/1/image_url/url")
                .and_then(Value::as_str),
            Some("data:image/jpeg;base64,AAAA")
        );
    }

    #[test]
    fn first_choice_is_the_answer() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":" WBK1234 "}}]}"#;
        assert_eq!(parse_answer(body).expect("answer"), " WBK1234 ");
    }

    #[rstest]
    #[case(br#"{"choices":[]}"#.as_slice())]
    #[case(b"<html>bad gateway</html>".as_slice())]
    fn unusable_bodies_are_invalid_responses(#[case] body: &[u8]) {
        assert!(matches!(
            parse_answer(body),
            Err(FrameNumberReaderError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn error_statuses_include_a_body_preview() {
        let error = map_status_error(StatusCode::UNAUTHORIZED, b"{\"error\": \"bad key\"}");
        assert_eq!(
            error,
            FrameNumberReaderError::unavailable("status 401: {\"error\": \"bad key\"}")
        );
    }
}
