//! Persona replies for a whole message thread, answered as one JSON request.
//!
//! Request `{"messages": [{"text", "sender"}], "vibe"}`, response
//! `{"reply"}` or `{"error"}`.
use serde::{Deserialize, Serialize};

use textback_core::config::ThreadSettings;
use textback_core::traits::{ChatCompleter, VectorIndex};
use textback_core::types::ChatMessage;
use textback_core::{Error, Result};

pub const INVALID_HISTORY: &str = "Invalid or empty message history.";
pub const REPLY_FAILED: &str = "Failed to generate reply.";

const EXAMPLE_COUNT: usize = 3;

const PERSONA_PREAMBLE: &str = "you are texting as an 18-year-old girl on twitter.";
const STYLE_RULES: &str = "use lowercase. keep the reply short and casual. no long paragraphs. never say you're flirty. no proper punctuation except question mark.";

/// How warm the persona is. Unknown names fall back to `Friendly`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Vibe {
    Flirty,
    Comfortable,
    #[default]
    Friendly,
}

impl From<String> for Vibe {
    fn from(name: String) -> Self {
        match name.as_str() {
            "flirty" => Vibe::Flirty,
            "comfortable" => Vibe::Comfortable,
            _ => Vibe::Friendly,
        }
    }
}

impl Vibe {
    pub fn instructions(self) -> &'static str {
        match self {
            Vibe::Flirty => "you're an 18-year-old girl who's now comfortable texting the guy. you're cute, teasing, and playful. use casual slang and short lowercase replies. avoid emojis unless natural at the end. do not agree to meet up, you can tease but stay distant.",
            Vibe::Comfortable => "you're an 18-year-old girl who's getting to know the guy and starting to relax. you're warm and soft-spoken, casual and curious. lowercase always. keep it short and natural.",
            Vibe::Friendly => "you're shy and polite, just getting to know the guy. always lowercase, keep replies short, sweet and friendly.",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThreadMessage {
    pub text: String,
    /// `"user"` for the other side; anything else is us.
    pub sender: String,
}

impl ThreadMessage {
    fn speaker(&self) -> &'static str {
        if self.sender == "user" { "he" } else { "you" }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReplyRequest {
    pub messages: Vec<ThreadMessage>,
    pub vibe: Vibe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyResponse {
    Reply { reply: String },
    Error { error: String },
}

impl ReplyResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ReplyResponse::Error { .. })
    }
}

pub fn system_prompt(vibe: Vibe) -> String {
    format!("{} {}\n{}", PERSONA_PREAMBLE, vibe.instructions(), STYLE_RULES)
}

/// The last `limit` messages as lowercase `he:`/`you:` lines.
pub fn thread_context(messages: &[ThreadMessage], limit: usize) -> String {
    let start = messages.len().saturating_sub(limit);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.speaker(), m.text.to_lowercase()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct ThreadReplier<'a> {
    index: &'a dyn VectorIndex,
    chat: &'a dyn ChatCompleter,
    settings: ThreadSettings,
}

impl<'a> ThreadReplier<'a> {
    pub fn new(index: &'a dyn VectorIndex, chat: &'a dyn ChatCompleter, settings: ThreadSettings) -> Self {
        Self { index, chat, settings }
    }

    /// Examples are the snippets nearest to the newest message, whoever sent it.
    pub fn reply(&self, request: &ReplyRequest) -> Result<String> {
        let last = request
            .messages
            .last()
            .ok_or_else(|| Error::InvalidRequest(INVALID_HISTORY.to_string()))?;
        let examples = self.index.query(&last.text, EXAMPLE_COUNT)?.documents().join("\n").to_lowercase();

        let system = system_prompt(request.vibe);
        let context = thread_context(&request.messages, self.settings.context_messages);
        let user = format!("{}\n\n{}\n\n{}\nyou:", system, examples, context);
        tracing::debug!(vibe = ?request.vibe, thread_len = request.messages.len(), "thread reply");

        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let reply = self.chat.complete(&messages, &self.settings.model, self.settings.temperature)?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Ok(self.settings.fallback_reply.clone());
        }
        Ok(reply.to_string())
    }

    /// Answer a raw JSON body. Failures become an `error` response; the
    /// cause is only logged.
    pub fn respond_json(&self, body: &str) -> ReplyResponse {
        let request: ReplyRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable reply request");
                return ReplyResponse::Error { error: INVALID_HISTORY.to_string() };
            }
        };
        match self.reply(&request) {
            Ok(reply) => ReplyResponse::Reply { reply },
            Err(Error::InvalidRequest(msg)) => ReplyResponse::Error { error: msg },
            Err(e) => {
                tracing::error!(error = %e, "error generating reply");
                ReplyResponse::Error { error: REPLY_FAILED.to_string() }
            }
        }
    }
}
