use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SummarizerError;

/// Query marker that precedes the video id in a watch URL
const WATCH_MARKER: &str = "watch?v=";

/// Delimiter that ends the video id inside a watch URL query
const PARAM_DELIMITER: char = '&';

/// Path shapes that carry the id as the next path segment
const PATH_MARKERS: &[&str] = &["youtu.be/", "/embed/", "/shorts/", "/v/", "/live/"];

/// Opaque YouTube video identifier extracted from user input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoReference(String);

impl VideoReference {
    /// Extract the video id from a URL, or accept a bare id.
    ///
    /// For watch URLs the id is whatever follows the last `watch?v=` up to the next `&`.
    /// Short and embed links take the following path segment. Anything else is taken
    /// verbatim. The id must not be empty.
    pub fn parse(input: &str) -> Result<Self, SummarizerError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SummarizerError::Validation("Please enter a YouTube URL".to_string()));
        }

        let candidate = if let Some((_, rest)) = input.rsplit_once(WATCH_MARKER) {
            rest.split(PARAM_DELIMITER).next().unwrap_or_default()
        } else if let Some(rest) = PATH_MARKERS
            .iter()
            .find_map(|marker| input.split_once(marker).map(|(_, rest)| rest))
        {
            rest.split(['?', '&', '#', '/']).next().unwrap_or_default()
        } else {
            input
        };

        let id = candidate.trim();
        if id.is_empty() {
            return Err(SummarizerError::Validation(format!(
                "Could not extract a video id from: {}",
                input
            )));
        }

        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/{}{}", WATCH_MARKER, self.0)
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VideoReference {
    type Err = SummarizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
