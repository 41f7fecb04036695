//! Request and response bodies of the chat completions endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct ChatRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) messages: Vec<MessageDto<'a>>,
    pub(super) max_tokens: u32,
    pub(super) temperature: f32,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageDto<'a> {
    pub(super) role: &'static str,
    pub(super) content: Vec<ContentPartDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum ContentPartDto<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrlDto },
}

#[derive(Debug, Serialize)]
pub(super) struct ImageUrlDto {
    pub(super) url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponseDto {
    #[serde(default)]
    pub(super) choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceDto {
    pub(super) message: ChoiceMessageDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceMessageDto {
    pub(super) content: Option<String>,
}

impl ChatResponseDto {
    /// Text of the first choice.
    pub(super) fn into_answer(self) -> Result<String, String> {
        self.choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_owned())
            .map(|choice| choice.message.content.unwrap_or_default())
    }
}
