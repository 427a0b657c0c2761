use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

use crate::routing::NetworkRouting;
use crate::video::VideoReference;

pub use youtube::YoutubeTranscriptSource;

/// One caption fragment, in the order the platform emitted it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start time in seconds, when the platform reports one
    pub start: Option<f64>,

    /// Duration in seconds, when the platform reports one
    pub duration: Option<f64>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            duration: None,
        }
    }

    pub fn timed(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
            duration: Some(duration),
        }
    }
}

/// Why a transcript fetch failed
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Subtitles are disabled for video {video_id}")]
    CaptionsDisabled { video_id: String },

    #[error("No transcript found for video {video_id} in languages [{languages}]")]
    TranscriptNotFound { video_id: String, languages: String },

    #[error("Caption track for video {video_id} contains no text")]
    EmptyTranscript { video_id: String },

    #[error("YouTube is blocking transcript requests: {0}")]
    RequestBlocked(String),

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("Cookie file error: {0}")]
    Cookies(String),

    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Failures where the video simply has no usable captions, as opposed to the fetch
    /// itself breaking.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FetchError::CaptionsDisabled { .. }
                | FetchError::TranscriptNotFound { .. }
                | FetchError::EmptyTranscript { .. }
        )
    }

    pub fn remediation(&self) -> &'static str {
        match self {
            FetchError::CaptionsDisabled { .. }
            | FetchError::TranscriptNotFound { .. }
            | FetchError::EmptyTranscript { .. } => {
                "This video has no usable captions. Paste the transcript manually or pass --transcript-file."
            }
            FetchError::VideoUnavailable { .. } => {
                "Check the URL. Age-restricted or private videos need a cookie file (--cookies)."
            }
            FetchError::Cookies(_) => {
                "Export your YouTube cookies in Netscape format and pass the file with --cookies."
            }
            FetchError::Proxy(_) => "Check the proxy URI and that the proxy is reachable.",
            FetchError::RequestBlocked(_) | FetchError::Transport(_) | FetchError::MalformedResponse(_) => {
                "YouTube may be blocking requests from this address. Retry with a proxy (--proxy) or a cookie file (--cookies)."
            }
        }
    }
}

/// Remote capability that fetches caption segments for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the caption segments of a video, in platform order
    async fn fetch(
        &self,
        video: &VideoReference,
        routing: &NetworkRouting,
    ) -> std::result::Result<Vec<TranscriptSegment>, FetchError>;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}
