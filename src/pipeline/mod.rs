use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::acquire::{FallbackPolicy, ManualTranscriptProvider, TranscriptAcquirer, TranscriptOrigin};
use crate::config::Config;
use crate::normalize::{HttpPunctuationRestorer, PunctuationRestorer, TextNormalizer};
use crate::routing::RoutingRequest;
use crate::source::{FetchError, TranscriptSource, YoutubeTranscriptSource};
use crate::summarize::{ApiKey, GeminiClient, GeminiModel, GenerationBackend, SummarizationClient};
use crate::video::VideoReference;
use crate::SummarizerError;

/// Pipeline states, in the only order they can be visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Start,
    Acquiring,
    Normalizing,
    Summarizing,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Start => write!(f, "START"),
            PipelineState::Acquiring => write!(f, "ACQUIRING"),
            PipelineState::Normalizing => write!(f, "NORMALIZING"),
            PipelineState::Summarizing => write!(f, "SUMMARIZING"),
            PipelineState::Done => write!(f, "DONE"),
        }
    }
}

/// Terminal failure of one invocation: the state it failed in and why
#[derive(thiserror::Error, Debug)]
#[error("FAILED({stage}): {error}")]
pub struct PipelineFailure {
    pub stage: PipelineState,
    pub error: SummarizerError,
}

impl PipelineFailure {
    fn at(stage: PipelineState) -> impl FnOnce(SummarizerError) -> Self {
        move |error| Self { stage, error }
    }

    pub fn remediation(&self) -> Option<&'static str> {
        self.error.remediation()
    }
}

/// Everything a caller supplies for one invocation
pub struct PipelineRequest {
    /// URL (or bare id) of the video
    pub url: String,

    /// Gemini API key, bound to this invocation only
    pub api_key: String,

    pub model: GeminiModel,

    pub routing: RoutingRequest,
}

impl fmt::Debug for PipelineRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRequest")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("routing", &self.routing)
            .finish()
    }
}

/// Final output: the summary and the normalized transcript it was written from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryArtifact {
    /// Generated summary (markdown)
    pub content: String,

    /// Normalized transcript the summary was derived from
    pub transcript: String,

    pub video_id: String,

    pub model: GeminiModel,

    /// Whether the transcript was fetched or typed in by a person
    pub transcript_origin: TranscriptOrigin,

    /// Word count of the raw transcript
    pub word_count: usize,

    pub completed_at: DateTime<Utc>,
}

/// Acquire -> normalize -> summarize, one invocation at a time per call
pub struct SummaryPipeline {
    acquirer: TranscriptAcquirer,
    normalizer: TextNormalizer,
    summarizer: SummarizationClient,
    show_progress: bool,
}

impl SummaryPipeline {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        restorer: Arc<dyn PunctuationRestorer>,
        backend: Arc<dyn GenerationBackend>,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            acquirer: TranscriptAcquirer::new(source, policy),
            normalizer: TextNormalizer::new(restorer),
            summarizer: SummarizationClient::new(backend),
            show_progress: false,
        }
    }

    /// Build the production pipeline from configuration
    pub fn from_config(config: &Config, policy: FallbackPolicy) -> crate::Result<Self> {
        let source = YoutubeTranscriptSource::new(
            config.transcript.languages.clone(),
            Duration::from_secs(config.transcript.timeout_secs),
        );
        let restorer = HttpPunctuationRestorer::new(
            &config.punctuation.endpoint,
            Duration::from_secs(config.punctuation.timeout_secs),
        )?;
        let backend = GeminiClient::new(&config.gemini.endpoint, Duration::from_secs(config.gemini.timeout_secs))?;

        Ok(Self::new(Arc::new(source), Arc::new(restorer), Arc::new(backend), policy))
    }

    /// Show spinners on the terminal while stages run
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run one invocation to completion.
    ///
    /// Stages run strictly in sequence; the first failure ends the invocation and no
    /// later stage sees any input.
    pub async fn run(
        &self,
        request: PipelineRequest,
        fallback: &dyn ManualTranscriptProvider,
    ) -> Result<SummaryArtifact, PipelineFailure> {
        let span = tracing::info_span!("pipeline", invocation = %Uuid::new_v4());
        self.run_stages(request, fallback).instrument(span).await
    }

    async fn run_stages(
        &self,
        request: PipelineRequest,
        fallback: &dyn ManualTranscriptProvider,
    ) -> Result<SummaryArtifact, PipelineFailure> {
        self.enter(PipelineState::Start);
        let video = VideoReference::parse(&request.url).map_err(PipelineFailure::at(PipelineState::Start))?;
        let api_key = ApiKey::new(request.api_key).map_err(PipelineFailure::at(PipelineState::Start))?;
        request
            .routing
            .validate()
            .map_err(PipelineFailure::at(PipelineState::Start))?;

        self.enter(PipelineState::Acquiring);
        let raw = {
            let scoped = request
                .routing
                .materialize()
                .map_err(PipelineFailure::at(PipelineState::Acquiring))?;

            let progress = self.spinner("Fetching transcript…");
            let prompt = SuspendingProvider {
                inner: fallback,
                progress: &progress,
            };
            let result = self.acquirer.acquire(&video, scoped.routing(), &prompt).await;
            progress.finish_and_clear();

            // Uploaded cookies are removed here, whatever the outcome.
            drop(scoped);
            result.map_err(PipelineFailure::at(PipelineState::Acquiring))?
        };

        self.enter(PipelineState::Normalizing);
        let progress = self.spinner("Restoring punctuation…");
        let normalized = self.normalizer.normalize(&raw).await;
        progress.finish_and_clear();
        let normalized = normalized.map_err(PipelineFailure::at(PipelineState::Normalizing))?;

        self.enter(PipelineState::Summarizing);
        let progress = self.spinner("Summarizing transcript…");
        let summary = self.summarizer.summarize(&normalized, request.model, &api_key).await;
        progress.finish_and_clear();
        let summary = summary.map_err(PipelineFailure::at(PipelineState::Summarizing))?;

        self.enter(PipelineState::Done);
        Ok(SummaryArtifact {
            content: summary.content,
            transcript: normalized.into_string(),
            video_id: video.to_string(),
            model: summary.model,
            transcript_origin: raw.origin(),
            word_count: raw.word_count(),
            completed_at: Utc::now(),
        })
    }

    fn enter(&self, state: PipelineState) {
        tracing::info!(state = %state, "Pipeline entered {}", state);
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}

/// Hides the spinner while a person is typing a transcript
struct SuspendingProvider<'a> {
    inner: &'a dyn ManualTranscriptProvider,
    progress: &'a ProgressBar,
}

impl ManualTranscriptProvider for SuspendingProvider<'_> {
    fn provide(&self, failure: &FetchError) -> Option<String> {
        self.progress.suspend(|| self.inner.provide(failure))
    }
}
