use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod fallback;

use crate::routing::NetworkRouting;
use crate::source::{FetchError, TranscriptSegment, TranscriptSource};
use crate::utils::preview;
use crate::video::VideoReference;
use crate::SummarizerError;

pub use fallback::{ConsolePrompt, FileTranscript, FixedTranscript, ManualTranscriptProvider, NoManualTranscript};

/// Which fetch failures hand over to the manual fallback provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Only "no captions" failures fall back; transport problems are reported
    #[default]
    RecoverableOnly,
    /// Every fetch failure falls back to manual entry
    Always,
}

impl FallbackPolicy {
    pub fn allows(&self, failure: &FetchError) -> bool {
        match self {
            FallbackPolicy::RecoverableOnly => failure.is_recoverable(),
            FallbackPolicy::Always => true,
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::RecoverableOnly => write!(f, "recoverable-only"),
            FallbackPolicy::Always => write!(f, "always"),
        }
    }
}

/// Where a raw transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptOrigin {
    Fetched,
    Manual,
}

impl fmt::Display for TranscriptOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptOrigin::Fetched => write!(f, "fetched"),
            TranscriptOrigin::Manual => write!(f, "manual"),
        }
    }
}

/// Unpunctuated transcript text, never blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTranscript {
    text: String,
    origin: TranscriptOrigin,
}

impl RawTranscript {
    /// Join segment texts with single spaces, keeping their order
    pub fn from_segments(segments: &[TranscriptSegment]) -> Result<Self, SummarizerError> {
        let text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(text, TranscriptOrigin::Fetched)
    }

    pub fn manual(text: impl Into<String>) -> Result<Self, SummarizerError> {
        Self::new(text.into(), TranscriptOrigin::Manual)
    }

    fn new(text: String, origin: TranscriptOrigin) -> Result<Self, SummarizerError> {
        if text.trim().is_empty() {
            return Err(SummarizerError::Validation("Transcript is required to proceed".to_string()));
        }
        Ok(Self { text, origin })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> TranscriptOrigin {
        self.origin
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Fetches a transcript once and applies the fallback policy on failure
pub struct TranscriptAcquirer {
    source: Arc<dyn TranscriptSource>,
    policy: FallbackPolicy,
}

impl TranscriptAcquirer {
    pub fn new(source: Arc<dyn TranscriptSource>, policy: FallbackPolicy) -> Self {
        Self { source, policy }
    }

    /// Acquire the raw transcript for `video`.
    ///
    /// A single fetch is attempted. Failures the policy allows are handed to `fallback`;
    /// anything else comes back as [`SummarizerError::Acquisition`].
    pub async fn acquire(
        &self,
        video: &VideoReference,
        routing: &NetworkRouting,
        fallback: &dyn ManualTranscriptProvider,
    ) -> Result<RawTranscript, SummarizerError> {
        tracing::info!("Fetching transcript from {} for video: {}", self.source.source_name(), video);

        let failure = match self.source.fetch(video, routing).await {
            Ok(segments) => match RawTranscript::from_segments(&segments) {
                Ok(raw) => {
                    tracing::info!("Transcript fetched ({} words)", raw.word_count());
                    return Ok(raw);
                }
                Err(_) => FetchError::EmptyTranscript {
                    video_id: video.to_string(),
                },
            },
            Err(failure) => failure,
        };

        if !self.policy.allows(&failure) {
            tracing::warn!("Transcript fetch failed without fallback: {}", failure);
            return Err(SummarizerError::Acquisition(failure));
        }

        tracing::warn!("Transcript fetch failed ({}), asking for manual transcript", failure);

        let text = fallback.provide(&failure).unwrap_or_default();
        let raw = RawTranscript::manual(text)?;
        tracing::info!("Using manual transcript ({} words)", raw.word_count());
        tracing::debug!("Manual transcript starts: {}", preview(raw.as_str(), 80));
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::fallback::MockManualTranscriptProvider;
    use crate::source::MockTranscriptSource;

    fn video() -> VideoReference {
        VideoReference::parse("abc123").unwrap()
    }

    fn source_returning(
        result: Result<Vec<TranscriptSegment>, FetchError>,
    ) -> Arc<dyn TranscriptSource> {
        let mut source = MockTranscriptSource::new();
        source.expect_source_name().return_const("mock");
        source
            .expect_fetch()
            .times(1)
            .returning(move |_, _| result.clone());
        Arc::new(source)
    }

    fn untouched_fallback() -> MockManualTranscriptProvider {
        let mut fallback = MockManualTranscriptProvider::new();
        fallback.expect_provide().times(0);
        fallback
    }

    #[tokio::test]
    async fn test_segments_are_joined_in_order() {
        let segments = vec![
            TranscriptSegment::new("hello"),
            TranscriptSegment::new("big"),
            TranscriptSegment::new("world"),
        ];
        let acquirer = TranscriptAcquirer::new(source_returning(Ok(segments)), FallbackPolicy::default());

        let raw = acquirer
            .acquire(&video(), &NetworkRouting::direct(), &untouched_fallback())
            .await
            .unwrap();

        assert_eq!(raw.as_str(), "hello big world");
        assert_eq!(raw.origin(), TranscriptOrigin::Fetched);
    }

    #[tokio::test]
    async fn test_captions_disabled_uses_manual_text() {
        let failure = FetchError::CaptionsDisabled { video_id: "abc123".into() };
        let acquirer = TranscriptAcquirer::new(source_returning(Err(failure)), FallbackPolicy::RecoverableOnly);

        let mut fallback = MockManualTranscriptProvider::new();
        fallback
            .expect_provide()
            .withf(|failure| failure.is_recoverable())
            .times(1)
            .returning(|_| Some("typed by hand".to_string()));

        let raw = acquirer
            .acquire(&video(), &NetworkRouting::direct(), &fallback)
            .await
            .unwrap();

        assert_eq!(raw.as_str(), "typed by hand");
        assert_eq!(raw.origin(), TranscriptOrigin::Manual);
    }

    #[tokio::test]
    async fn test_blank_manual_text_is_a_validation_error() {
        for answer in [None, Some(String::new()), Some("  \n\t ".to_string())] {
            let failure = FetchError::TranscriptNotFound {
                video_id: "abc123".into(),
                languages: "en".into(),
            };
            let acquirer = TranscriptAcquirer::new(source_returning(Err(failure)), FallbackPolicy::RecoverableOnly);

            let mut fallback = MockManualTranscriptProvider::new();
            fallback.expect_provide().times(1).return_const(answer);

            let err = acquirer
                .acquire(&video(), &NetworkRouting::direct(), &fallback)
                .await
                .unwrap_err();
            assert!(matches!(err, SummarizerError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced_under_default_policy() {
        let failure = FetchError::Transport("connection reset".into());
        let acquirer = TranscriptAcquirer::new(source_returning(Err(failure.clone())), FallbackPolicy::RecoverableOnly);

        let err = acquirer
            .acquire(&video(), &NetworkRouting::direct(), &untouched_fallback())
            .await
            .unwrap_err();

        match err {
            SummarizerError::Acquisition(inner) => assert_eq!(inner, failure),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_when_policy_is_always() {
        let failure = FetchError::RequestBlocked("HTTP 429".into());
        let acquirer = TranscriptAcquirer::new(source_returning(Err(failure)), FallbackPolicy::Always);

        let mut fallback = MockManualTranscriptProvider::new();
        fallback
            .expect_provide()
            .times(1)
            .returning(|_| Some("from the operator".to_string()));

        let raw = acquirer
            .acquire(&video(), &NetworkRouting::direct(), &fallback)
            .await
            .unwrap();
        assert_eq!(raw.as_str(), "from the operator");
    }

    #[tokio::test]
    async fn test_blank_caption_track_falls_back() {
        let segments = vec![TranscriptSegment::new(" "), TranscriptSegment::new("")];
        let acquirer = TranscriptAcquirer::new(source_returning(Ok(segments)), FallbackPolicy::RecoverableOnly);

        let mut fallback = MockManualTranscriptProvider::new();
        fallback
            .expect_provide()
            .times(1)
            .returning(|_| Some("manual".to_string()));

        let raw = acquirer
            .acquire(&video(), &NetworkRouting::direct(), &fallback)
            .await
            .unwrap();
        assert_eq!(raw.origin(), TranscriptOrigin::Manual);
    }

    #[tokio::test]
    async fn test_blank_caption_track_is_reported_as_empty() {
        let segments = vec![TranscriptSegment::new("  ")];
        let acquirer = TranscriptAcquirer::new(source_returning(Ok(segments)), FallbackPolicy::RecoverableOnly);

        let mut fallback = MockManualTranscriptProvider::new();
        fallback
            .expect_provide()
            .withf(|failure| {
                *failure == FetchError::EmptyTranscript { video_id: "abc123".into() }
                    && failure.to_string() == "Caption track for video abc123 contains no text"
            })
            .times(1)
            .returning(|_| None);

        let err = acquirer
            .acquire(&video(), &NetworkRouting::direct(), &fallback)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_routing_is_passed_to_source() {
        let mut source = MockTranscriptSource::new();
        source.expect_source_name().return_const("mock");
        source
            .expect_fetch()
            .withf(|video, routing| {
                video.as_str() == "abc123" && routing.proxy.as_deref() == Some("http://proxy.local:3128")
            })
            .times(1)
            .returning(|_, _| Ok(vec![TranscriptSegment::new("routed")]));

        let acquirer = TranscriptAcquirer::new(Arc::new(source), FallbackPolicy::default());
        let routing = NetworkRouting::direct().with_proxy("http://proxy.local:3128");

        let raw = acquirer
            .acquire(&video(), &routing, &untouched_fallback())
            .await
            .unwrap();
        assert_eq!(raw.as_str(), "routed");
    }

    #[test]
    fn test_policy_allows() {
        let transport = FetchError::Transport("x".into());
        let disabled = FetchError::CaptionsDisabled { video_id: "abc".into() };

        assert!(FallbackPolicy::RecoverableOnly.allows(&disabled));
        assert!(!FallbackPolicy::RecoverableOnly.allows(&transport));
        assert!(FallbackPolicy::Always.allows(&transport));
    }
}
