use textback_core::config::Settings;
use textback_core::traits::{ChatCompleter, VectorIndex};
use textback_core::types::QueryResult;
use textback_core::Result;

use crate::prompt::build_messages;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.85;
pub const DEFAULT_K: usize = 3;

/// Retrieval-augmented reply: top-k similar snippets become the context of a
/// single chat completion request.
pub struct ReplyGenerator<'a> {
    index: &'a dyn VectorIndex,
    chat: &'a dyn ChatCompleter,
    model: String,
    temperature: f32,
    k: usize,
}

impl<'a> ReplyGenerator<'a> {
    pub fn new(index: &'a dyn VectorIndex, chat: &'a dyn ChatCompleter) -> Self {
        Self { index, chat, model: DEFAULT_MODEL.to_string(), temperature: DEFAULT_TEMPERATURE, k: DEFAULT_K }
    }

    pub fn from_settings(index: &'a dyn VectorIndex, chat: &'a dyn ChatCompleter, settings: &Settings) -> Self {
        Self {
            index,
            chat,
            model: settings.generation.model.clone(),
            temperature: settings.generation.temperature,
            k: settings.retrieval.k,
        }
    }

    pub fn retrieve(&self, user_input: &str) -> Result<QueryResult> {
        self.index.query(user_input, self.k)
    }

    pub fn generate(&self, user_input: &str) -> Result<String> {
        let context = self.retrieve(user_input)?.documents().join("\n");
        let messages = build_messages(&context, user_input);
        tracing::debug!(context_chars = context.len(), model = %self.model, "requesting completion");

        let reply = self.chat.complete(&messages, &self.model, self.temperature)?;
        Ok(reply.trim().to_string())
    }
}
