//! Video Summarizer - turn a YouTube link into a short written summary
//!
//! This library fetches the caption transcript of a video (falling back to text pasted by a
//! human when the fetch is impossible), restores its punctuation through an external
//! restoration service and asks a Gemini model for a concise summary.

pub mod acquire;
pub mod cli;
pub mod config;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod routing;
pub mod source;
pub mod summarize;
pub mod utils;
pub mod video;

pub use acquire::{FallbackPolicy, ManualTranscriptProvider, RawTranscript, TranscriptAcquirer};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use normalize::{NormalizedTranscript, PunctuationRestorer, TextNormalizer};
pub use pipeline::{PipelineFailure, PipelineRequest, PipelineState, SummaryArtifact, SummaryPipeline};
pub use routing::{CookieSource, NetworkRouting, RoutingRequest};
pub use source::{FetchError, TranscriptSegment, TranscriptSource};
pub use summarize::{ApiKey, GeminiModel, GenerationBackend, SummarizationClient};
pub use video::VideoReference;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the summarizer pipeline
#[derive(thiserror::Error, Debug)]
pub enum SummarizerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transcript acquisition failed: {0}")]
    Acquisition(#[from] FetchError),

    #[error("Punctuation restoration failed: {0}")]
    Normalization(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),
}

impl SummarizerError {
    /// A user-facing hint on how to get past this failure, when there is one
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            SummarizerError::Validation(_) => None,
            SummarizerError::Acquisition(err) => Some(err.remediation()),
            SummarizerError::Normalization(_) => {
                Some("Check that the punctuation service configured under `punctuation.endpoint` is running.")
            }
            SummarizerError::Summarization(_) => {
                Some("Check your Gemini API key and the selected model, then try again.")
            }
        }
    }
}
