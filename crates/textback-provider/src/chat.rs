use serde::{Deserialize, Serialize};

use textback_core::traits::ChatCompleter;
use textback_core::types::ChatMessage;
use textback_core::Result;

use crate::client::{ApiClient, Service};

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Single blocking call to `/chat/completions`; no streaming.
pub struct OpenAiChat {
    client: ApiClient,
    max_tokens: Option<u32>,
}

impl OpenAiChat {
    pub fn new(client: ApiClient) -> Self {
        Self { client, max_tokens: None }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl ChatCompleter for OpenAiChat {
    fn complete(&self, messages: &[ChatMessage], model: &str, temperature: f32) -> Result<String> {
        let request = ChatCompletionRequest { model, messages, temperature, max_tokens: self.max_tokens };
        let response: ChatCompletionResponse = self.client.post_json(Service::Chat, "chat/completions", &request)?;
        first_choice_text(response)
    }
}

fn first_choice_text(response: ChatCompletionResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Service::Chat.error("completion returned no choices"))?;
    choice
        .message
        .content
        .ok_or_else(|| Service::Chat.error("first choice has no text content"))
}
