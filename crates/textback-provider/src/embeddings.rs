use serde::{Deserialize, Serialize};

use textback_core::traits::Embedder;
use textback_core::Result;

use crate::client::{ApiClient, Service};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings from the hosted `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: ApiClient,
    model: String,
    dim: usize,
    id: String,
}

impl OpenAiEmbedder {
    pub fn new(client: ApiClient, model: impl Into<String>, dim: usize) -> Self {
        let model = model.into();
        let id = format!("openai:{}", model);
        Self { client, model, dim, id }
    }
}

impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingRequest { model: &self.model, input: texts };
        let response: EmbeddingResponse = self.client.post_json(Service::Embeddings, "embeddings", &request)?;
        tracing::debug!(inputs = texts.len(), model = %self.model, "embedded batch");
        into_ordered_vectors(response, texts.len(), self.dim)
    }
}

fn into_ordered_vectors(response: EmbeddingResponse, expected: usize, dim: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(Service::Embeddings.error(format!("expected {} embeddings, got {}", expected, data.len())));
    }
    data.sort_by_key(|d| d.index);
    data.into_iter()
        .map(|d| {
            if d.embedding.len() == dim {
                Ok(d.embedding)
            } else {
                Err(Service::Embeddings.error(format!(
                    "embedding {} has dimension {}, expected {}",
                    d.index,
                    d.embedding.len(),
                    dim
                )))
            }
        })
        .collect()
}
