//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_GENERATION__TEMPERATURE=0.7`). A `.env` file is read first if present.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub dataset_path: String,
    pub index_dir: String,
    pub collection: String,
    /// Messages kept from the end of each conversation.
    pub window: usize,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dataset_path: "flirty-text-bot-fixed-expanded.jsonl".to_string(),
            index_dir: ".lancedb".to_string(),
            collection: "flirty".to_string(),
            window: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    Openai,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub dim: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Openai,
            model: "text-embedding-3-small".to_string(),
            dim: 1536,
            batch_size: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { model: "gpt-4o".to_string(), temperature: 0.85, max_tokens: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry_transient: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            retry_transient: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { k: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub label: String,
    pub prompt: String,
    /// Stop the loop on the first failed turn instead of reporting it.
    pub fail_fast: bool,
    pub min_delay_secs: u64,
    pub delay_spread: u8,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            label: "You".to_string(),
            prompt: "Enter a message: ".to_string(),
            fail_fast: false,
            min_delay_secs: 2,
            delay_spread: 3,
        }
    }
}

/// Thread replies: a persona reply for a whole message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// How many trailing thread messages go into the prompt.
    pub context_messages: usize,
    /// Sent when the completion comes back blank.
    pub fallback_reply: String,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.9,
            max_tokens: 100,
            context_messages: 6,
            fallback_reply: "hmm ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub api: ApiSettings,
    pub retrieval: RetrievalSettings,
    pub session: SessionSettings,
    pub thread: ThreadSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.k == 0 {
            return Err(Error::InvalidConfig("retrieval.k must be at least 1".into()));
        }
        if self.data.window == 0 {
            return Err(Error::InvalidConfig("data.window must be at least 1".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be at least 1".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::InvalidConfig(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }
        if !(0.0..=2.0).contains(&self.thread.temperature) {
            return Err(Error::InvalidConfig(format!(
                "thread.temperature must be within 0.0..=2.0, got {}",
                self.thread.temperature
            )));
        }
        if self.thread.context_messages == 0 {
            return Err(Error::InvalidConfig("thread.context_messages must be at least 1".into()));
        }
        if self.session.delay_spread == 0 {
            return Err(Error::InvalidConfig("session.delay_spread must be at least 1".into()));
        }
        Ok(())
    }

    pub fn dataset_path(&self) -> PathBuf {
        expand_path(&self.data.dataset_path)
    }

    pub fn index_dir(&self) -> PathBuf {
        expand_path(&self.data.index_dir)
    }
}

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            other => tracing::warn!(env = other, "unknown RUST_ENV, using base config only"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, env_name })
    }

    /// Build from an explicit figment, e.g. defaults plus an inline TOML string.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment, env_name: "custom".to_string() }
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// The hosted model API key from `OPENAI_API_KEY`.
    pub fn api_key(&self) -> Result<String> {
        credential_from(env::var(API_KEY_VAR).ok())
    }
}

pub fn credential_from(value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::MissingCredential(format!("{} is not set", API_KEY_VAR))),
    }
}

/// Whether `APP_USE_FAKE_EMBEDDINGS` asks for the deterministic embedder.
pub fn use_fake_embeddings() -> bool {
    env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

