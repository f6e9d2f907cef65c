use std::time::Duration;

use crate::error::Result;
use crate::types::{ChatMessage, Meta, QueryResult};

pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `openai:text-embedding-3-small`).
    fn model_id(&self) -> &str;
    /// Embedding dimensionality.
    fn dim(&self) -> usize;
    /// One vector per input text, in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Persistent similarity index over documents.
///
/// Implementations embed with a single, fixed embedder so that load-time and
/// query-time vectors are comparable.
pub trait VectorIndex {
    fn count(&self) -> Result<usize>;
    /// `documents`, `metadatas` and `ids` are index-aligned and equal length.
    /// Fails if an id is repeated or already stored.
    fn add(&self, documents: &[String], metadatas: &[Meta], ids: &[String]) -> Result<()>;
    /// The `k` nearest documents to `text`, closest first. Never padded.
    fn query(&self, text: &str, k: usize) -> Result<QueryResult>;
}

pub trait ChatCompleter {
    fn complete(&self, messages: &[ChatMessage], model: &str, temperature: f32) -> Result<String>;
}

/// Pause between the two halves of a double-text.
pub trait DelayProvider {
    fn next_delay(&mut self) -> Duration;
}
