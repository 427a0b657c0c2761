use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ApiKey, GenerationBackend, GenerationRequest};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MARKDOWN_INSTRUCTION: &str = "Use markdown to format your answers.";

/// Gemini `generateContent` REST client
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    /// `endpoint` is the API origin, e.g. `https://generativelanguage.googleapis.com`
    pub fn new(endpoint: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Gemini")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn generate_url(&self, request: &GenerationRequest) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, request.model.id())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Fold description, instructions and formatting hint into one system instruction
fn system_instruction(request: &GenerationRequest) -> String {
    let mut instructions = request.instructions.clone();
    if request.markdown {
        instructions.push(MARKDOWN_INSTRUCTION.to_string());
    }

    let listed = instructions
        .iter()
        .map(|instruction| format!("- {}", instruction))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\n<instructions>\n{}\n</instructions>", request.description, listed)
}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(system_instruction(request)),
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(request.prompt.clone()),
            }],
        }],
    }
}

fn extract_text(response: GenerateContentResponse) -> crate::Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        anyhow::bail!("Gemini returned no summary: {}", reason);
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        anyhow::bail!(
            "Gemini returned an empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }

    Ok(text)
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, api_key: &ApiKey, request: &GenerationRequest) -> crate::Result<String> {
        let url = self.generate_url(request);
        tracing::debug!("Calling Gemini: {}", url);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key.expose())
            .json(&build_body(request))
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| match parsed.error.status {
                    Some(code) => format!("{} ({})", parsed.error.message, code),
                    None => parsed.error.message,
                })
                .unwrap_or(body);
            anyhow::bail!("Gemini API returned HTTP {}: {}", status, message.trim());
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Gemini returned an unexpected response body")?;

        extract_text(parsed)
    }

    fn backend_name(&self) -> &'static str {
        "Gemini"
    }
}
