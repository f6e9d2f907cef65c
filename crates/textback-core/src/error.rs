use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Index error: {0}")]
    Index(String),

    /// Embedding service failure. Surfaces through index `add`/`query`.
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    /// A reply request that cannot be answered as given.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Service failure worth one more attempt (connect, timeout, 429, 5xx).
    #[error("Transient service error: {0}")]
    Transient(Box<Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    /// Strip the transient marker once retries are exhausted.
    pub fn into_inner(self) -> Error {
        match self {
            Error::Transient(inner) => inner.into_inner(),
            other => other,
        }
    }

    pub fn index(e: impl std::fmt::Display) -> Self {
        Error::Index(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
