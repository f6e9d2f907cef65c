//! Blocking JSON client for the hosted model API.
//!
//! One request per call, retried once when the failure looks transient
//! (connect error, timeout, 429, 5xx). No backoff beyond that single retry.
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use textback_core::config::ApiSettings;
use textback_core::{Error, Result};

const ERROR_BODY_EXCERPT: usize = 200;

/// Which capability a request serves; decides the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Embeddings,
    Chat,
}

impl Service {
    pub fn error(self, message: impl Into<String>) -> Error {
        match self {
            Service::Embeddings => Error::Embedding(message.into()),
            Service::Chat => Error::Generation(message.into()),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    retry_transient: bool,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry_transient: settings.retry_transient,
        })
    }

    pub fn post_json<B, T>(&self, service: Service, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        match self.send_once(service, &url, body) {
            Err(e) if e.is_transient() && self.retry_transient => {
                tracing::warn!(%url, error = %e, "transient failure, retrying once");
                self.send_once(service, &url, body).map_err(Error::into_inner)
            }
            other => other.map_err(Error::into_inner),
        }
    }

    fn send_once<B, T>(&self, service: Service, url: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| {
                let err = service.error(format!("request to {} failed: {}", url, e));
                if e.is_connect() || e.is_timeout() { Error::Transient(Box::new(err)) } else { err }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(map_http_error(service, status, &text));
        }
        response
            .json::<T>()
            .map_err(|e| service.error(format!("malformed response from {}: {}", url, e)))
    }
}

pub(crate) fn map_http_error(service: Service, status: StatusCode, body: &str) -> Error {
    let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
        StatusCode::TOO_MANY_REQUESTS => "rate limited",
        s if s.is_server_error() => "server error",
        _ => "request rejected",
    };
    let err = service.error(format!("{} ({}): {}", kind, status.as_u16(), excerpt));
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Error::Transient(Box::new(err))
    } else {
        err
    }
}
