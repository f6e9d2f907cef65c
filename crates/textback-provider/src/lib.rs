//! Hosted model API capabilities: embeddings and chat completion, plus a
//! deterministic fake embedder.
pub mod chat;
pub mod client;
pub mod embeddings;
pub mod fake;

use textback_core::config::{use_fake_embeddings, EmbeddingProviderKind, Settings, API_KEY_VAR};
use textback_core::traits::Embedder;
use textback_core::{Error, Result};

pub use chat::OpenAiChat;
pub use client::ApiClient;
pub use embeddings::OpenAiEmbedder;
pub use fake::FakeEmbedder;

/// Pick the embedder for this run. `APP_USE_FAKE_EMBEDDINGS=1` or
/// `embedding.provider = "fake"` selects the deterministic one, which needs no key.
pub fn get_default_embedder(settings: &Settings, api_key: Option<&str>) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() || settings.embedding.provider == EmbeddingProviderKind::Fake {
        tracing::info!(dim = settings.embedding.dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(settings.embedding.dim)));
    }
    let key = api_key.ok_or_else(|| Error::MissingCredential(format!("{} is not set", API_KEY_VAR)))?;
    let client = ApiClient::new(&settings.api, key)?;
    Ok(Box::new(OpenAiEmbedder::new(client, settings.embedding.model.clone(), settings.embedding.dim)))
}

/// The generation capability backed by the hosted chat endpoint.
pub fn get_default_chat(settings: &Settings, api_key: &str) -> Result<OpenAiChat> {
    let client = ApiClient::new(&settings.api, api_key)?;
    Ok(OpenAiChat::new(client).with_max_tokens(settings.generation.max_tokens))
}
