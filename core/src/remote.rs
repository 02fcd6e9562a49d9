//! Remote answer provider consulted when no local match is trusted.

use crate::cancel::CancelToken;
use crate::error::RemoteProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest provider error body kept in [`RemoteProviderError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// An external service that answers free-text questions.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Returns the name of this provider implementation.
    fn name(&self) -> &str;

    /// Ask the provider. Implementations report every failure as an error,
    /// never as answer text.
    async fn fetch_answer(&self, query: &str) -> Result<String, RemoteProviderError>;
}

#[derive(Serialize)]
struct RemoteRequest<'a> {
    user_query: &'a str,
}

#[derive(Deserialize)]
struct RemoteResponse {
    #[serde(default)]
    response: Option<String>,
}

/// JSON-over-HTTP provider: `POST {"user_query": ..}` answered by `{"response": ..}`.
pub struct HttpAnswerProvider {
    client: Client,
    url: String,
}

impl HttpAnswerProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into() })
    }

    pub fn url(&self) -> &str { &self.url }
}

#[async_trait]
impl AnswerProvider for HttpAnswerProvider {
    fn name(&self) -> &str { "http" }

    async fn fetch_answer(&self, query: &str) -> Result<String, RemoteProviderError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&RemoteRequest { user_query: query })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        let bytes = resp.bytes().await?;
        let parsed: RemoteResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RemoteProviderError::MalformedResponse { reason: e.to_string() })?;
        match parsed.response {
            Some(answer) if !answer.trim().is_empty() => Ok(answer),
            Some(_) => Err(RemoteProviderError::MalformedResponse { reason: "empty `response` field".into() }),
            None => Err(RemoteProviderError::MalformedResponse { reason: "missing `response` field".into() }),
        }
    }
}

/// Provider used when no remote service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProvider;

#[async_trait]
impl AnswerProvider for DisabledProvider {
    fn name(&self) -> &str { "disabled" }

    async fn fetch_answer(&self, _query: &str) -> Result<String, RemoteProviderError> {
        Err(RemoteProviderError::NotConfigured)
    }
}

/// Ask `provider`, giving up after `timeout` or when `cancel` fires.
pub async fn fetch_with_deadline(
    provider: &dyn AnswerProvider,
    query: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<String, RemoteProviderError> {
    if cancel.is_cancelled() {
        return Err(RemoteProviderError::Cancelled);
    }
    let started = std::time::Instant::now();
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RemoteProviderError::Cancelled),
        res = tokio::time::timeout(timeout, provider.fetch_answer(query)) => match res {
            Ok(inner) => inner,
            Err(_) => Err(RemoteProviderError::Timeout { timeout_ms: timeout.as_millis() as u64 }),
        },
    };
    match &result {
        Ok(_) => tracing::info!(provider = provider.name(), took_ms = started.elapsed().as_millis() as u64, "remote answer received"),
        Err(e) => tracing::warn!(provider = provider.name(), error = %e, "remote lookup failed"),
    }
    result
}
