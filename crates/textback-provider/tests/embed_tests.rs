use textback_core::config::{EmbeddingProviderKind, Settings};
use textback_core::traits::Embedder;
use textback_core::Error;
use textback_provider::{get_default_embedder, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(64);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 64);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn fake_embedder_places_overlapping_texts_closer() {
    let embedder = FakeEmbedder::new(256);
    let q = embedder.embed_text("what are you doing tonight");
    let near = embedder.embed_text("what are you doing later tonight");
    let far = embedder.embed_text("pizza or tacos");
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&q, &near) > dot(&q, &far));
}

#[test]
fn fake_provider_needs_no_credential() {
    let mut settings = Settings::default();
    settings.embedding.provider = EmbeddingProviderKind::Fake;
    settings.embedding.dim = 32;
    let embedder = get_default_embedder(&settings, None).expect("fake embedder");
    assert_eq!(embedder.dim(), 32);
    assert_eq!(embedder.model_id(), "fake:d32");
}

#[test]
fn hosted_provider_without_credential_is_a_config_error() {
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok() {
        return;
    }
    let settings = Settings::default();
    let err = get_default_embedder(&settings, None).err().expect("missing key");
    assert!(matches!(err, Error::MissingCredential(_)));
}

#[test]
fn hosted_provider_reports_configured_model() {
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok() {
        return;
    }
    let settings = Settings::default();
    let embedder = get_default_embedder(&settings, Some("sk-test")).expect("embedder");
    assert_eq!(embedder.model_id(), "openai:text-embedding-3-small");
    assert_eq!(embedder.dim(), 1536);
    assert!(embedder.embed_batch(&[]).expect("empty batch").is_empty());
}
