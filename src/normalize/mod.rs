use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::acquire::RawTranscript;
use crate::SummarizerError;

/// Transcript text after punctuation restoration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedTranscript(String);

impl NormalizedTranscript {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Backend that infers punctuation, casing and sentence boundaries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PunctuationRestorer: Send + Sync {
    /// Restore punctuation for the whole text in one call
    async fn restore(&self, text: &str) -> crate::Result<String>;

    /// Get the name of this backend
    fn backend_name(&self) -> &'static str;
}

/// Turns a raw transcript into a normalized one, failing closed
pub struct TextNormalizer {
    restorer: Arc<dyn PunctuationRestorer>,
}

impl TextNormalizer {
    pub fn new(restorer: Arc<dyn PunctuationRestorer>) -> Self {
        Self { restorer }
    }

    pub async fn normalize(&self, raw: &RawTranscript) -> Result<NormalizedTranscript, SummarizerError> {
        tracing::info!("Restoring punctuation with {}", self.restorer.backend_name());

        let restored = self
            .restorer
            .restore(raw.as_str())
            .await
            .map_err(|e| SummarizerError::Normalization(format!("{:#}", e)))?;

        if restored.trim().is_empty() {
            return Err(SummarizerError::Normalization(
                "backend returned an empty transcript".to_string(),
            ));
        }

        Ok(NormalizedTranscript(restored))
    }
}

#[derive(Debug, Serialize)]
struct RestoreRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RestoreResponse {
    #[serde(alias = "punctuated", alias = "result")]
    text: String,
}

/// Punctuation restoration served over HTTP (e.g. an rpunct model behind a small web service).
///
/// Sends `POST {endpoint}` with `{"text": "..."}` and expects `{"text": "..."}` back.
pub struct HttpPunctuationRestorer {
    client: Client,
    endpoint: Url,
}

impl HttpPunctuationRestorer {
    pub fn new(endpoint: &str, timeout: Duration) -> crate::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid punctuation endpoint: {}", endpoint))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for punctuation service")?;

        Ok(Self { client, endpoint })
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PunctuationRestorer for HttpPunctuationRestorer {
    async fn restore(&self, text: &str) -> crate::Result<String> {
        tracing::debug!("Sending {} characters to {}", text.len(), self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&RestoreRequest { text })
            .send()
            .await
            .context("Punctuation service request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Punctuation service returned HTTP {}: {}", status, body.trim());
        }

        let restored: RestoreResponse = response
            .json()
            .await
            .context("Punctuation service returned an unexpected body")?;

        Ok(restored.text)
    }

    fn backend_name(&self) -> &'static str {
        "HTTP punctuation service"
    }
}
