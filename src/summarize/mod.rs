use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod gemini;

use crate::normalize::NormalizedTranscript;
use crate::SummarizerError;

pub use gemini::GeminiClient;

const SUMMARY_DESCRIPTION: &str = "Summarize a punctuated YouTube transcript";
const SUMMARY_INSTRUCTION: &str = "Provide a clear, concise summary of the text.";
const SUMMARY_PROMPT_PREFIX: &str = "Summarize the following text:\n\n";

/// Gemini model variants offered for summarization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum GeminiModel {
    /// Experimental fast variant
    #[default]
    #[serde(rename = "gemini-2.0-flash-exp")]
    #[value(name = "gemini-2.0-flash-exp")]
    FlashExp,

    /// Stable standard variant
    #[serde(rename = "gemini-2.0-flash")]
    #[value(name = "gemini-2.0-flash")]
    Flash,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 2] = [GeminiModel::FlashExp, GeminiModel::Flash];

    pub fn id(&self) -> &'static str {
        match self {
            GeminiModel::FlashExp => "gemini-2.0-flash-exp",
            GeminiModel::Flash => "gemini-2.0-flash",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GeminiModel::FlashExp => "experimental, lowest latency",
            GeminiModel::Flash => "stable, standard quality",
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GeminiModel {
    type Err = SummarizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeminiModel::ALL
            .into_iter()
            .find(|model| model.id() == s.trim())
            .ok_or_else(|| SummarizerError::Validation(format!("Unknown Gemini model: {}", s)))
    }
}

/// Credential for the generation backend, passed explicitly per call
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, SummarizerError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(SummarizerError::Validation("Please enter your Gemini API key".to_string()));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// One generation call: steering text plus the user prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: GeminiModel,
    pub description: String,
    pub instructions: Vec<String>,
    pub prompt: String,
    pub markdown: bool,
}

/// Remote language-model capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for `request`, authenticating with `api_key`
    async fn generate(&self, api_key: &ApiKey, request: &GenerationRequest) -> crate::Result<String>;

    /// Get the name of this backend
    fn backend_name(&self) -> &'static str;
}

/// Fixed steering for summaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryInstructions {
    pub description: String,
    pub instructions: Vec<String>,
}

impl Default for SummaryInstructions {
    fn default() -> Self {
        Self {
            description: SUMMARY_DESCRIPTION.to_string(),
            instructions: vec![SUMMARY_INSTRUCTION.to_string()],
        }
    }
}

/// Generated summary text and the model that wrote it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub content: String,
    pub model: GeminiModel,
}

/// Asks the generation backend for a summary of a normalized transcript
pub struct SummarizationClient {
    backend: Arc<dyn GenerationBackend>,
    instructions: SummaryInstructions,
}

impl SummarizationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            instructions: SummaryInstructions::default(),
        }
    }

    pub fn build_request(&self, transcript: &NormalizedTranscript, model: GeminiModel) -> GenerationRequest {
        GenerationRequest {
            model,
            description: self.instructions.description.clone(),
            instructions: self.instructions.instructions.clone(),
            prompt: format!("{}{}", SUMMARY_PROMPT_PREFIX, transcript.as_str()),
            markdown: true,
        }
    }

    /// Make exactly one generation call; no retries
    pub async fn summarize(
        &self,
        transcript: &NormalizedTranscript,
        model: GeminiModel,
        api_key: &ApiKey,
    ) -> Result<Summary, SummarizerError> {
        tracing::info!("Summarizing with {} ({})", self.backend.backend_name(), model);

        let request = self.build_request(transcript, model);
        let content = self
            .backend
            .generate(api_key, &request)
            .await
            .map_err(|e| SummarizerError::Summarization(format!("{:#}", e)))?;

        if content.trim().is_empty() {
            return Err(SummarizerError::Summarization("model returned an empty summary".to_string()));
        }

        Ok(Summary { content, model })
    }
}
