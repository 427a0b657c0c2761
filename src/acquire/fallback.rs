use console::{style, Term};
use std::io::BufRead;
use std::path::PathBuf;

use crate::source::FetchError;

/// Human-in-the-loop substitute for the automated transcript fetch
#[cfg_attr(test, mockall::automock)]
pub trait ManualTranscriptProvider: Send + Sync {
    /// Ask for transcript text after `failure`; `None` or blank text means nothing was given
    fn provide(&self, failure: &FetchError) -> Option<String>;
}

/// Never supplies text; automated fetch failures stay failures
pub struct NoManualTranscript;

impl ManualTranscriptProvider for NoManualTranscript {
    fn provide(&self, _failure: &FetchError) -> Option<String> {
        None
    }
}

/// Supplies a fixed text, for hosts that collected the transcript up front
pub struct FixedTranscript(pub String);

impl ManualTranscriptProvider for FixedTranscript {
    fn provide(&self, _failure: &FetchError) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Reads the transcript from a file on disk
pub struct FileTranscript {
    path: PathBuf,
}

impl FileTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ManualTranscriptProvider for FileTranscript {
    fn provide(&self, failure: &FetchError) -> Option<String> {
        tracing::info!("Auto-fetch failed ({}), reading transcript from: {}", failure, self.path.display());

        match fs_err::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Could not read transcript file: {}", e);
                None
            }
        }
    }
}

/// Asks the person at the terminal to paste the transcript
pub struct ConsolePrompt {
    term: Term,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self { term: Term::stderr() }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualTranscriptProvider for ConsolePrompt {
    fn provide(&self, failure: &FetchError) -> Option<String> {
        let banner = [
            format!("{}", style("⚠️  Auto-fetch failed. YouTube may be blocking transcript requests.").yellow()),
            format!("   {}", style(failure).dim()),
            format!(
                "Please paste your transcript below, then finish with a line containing only {} (or Ctrl-D):",
                style(END_OF_TRANSCRIPT).bold()
            ),
        ];
        for line in banner {
            if self.term.write_line(&line).is_err() {
                return None;
            }
        }

        let stdin = std::io::stdin();
        let text = read_pasted_transcript(stdin.lock());
        tracing::debug!("Read {} characters of pasted transcript", text.len());
        Some(text)
    }
}

/// Line that ends a pasted transcript before EOF
const END_OF_TRANSCRIPT: &str = ".";

/// Collect pasted lines until EOF or the end marker, keeping blank lines between paragraphs
fn read_pasted_transcript(reader: impl BufRead) -> String {
    let lines: Vec<String> = reader
        .lines()
        .map_while(|line| line.ok())
        .take_while(|line| line.trim() != END_OF_TRANSCRIPT)
        .collect();

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> FetchError {
        FetchError::TranscriptNotFound {
            video_id: "abc123".into(),
            languages: "en".into(),
        }
    }

    #[test]
    fn test_file_transcript_reads_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs_err::write(file.path(), "pasted words").unwrap();

        let provider = FileTranscript::new(file.path());
        assert_eq!(provider.provide(&not_found()).as_deref(), Some("pasted words"));
    }

    #[test]
    fn test_missing_file_yields_nothing() {
        let provider = FileTranscript::new("/nonexistent/transcript.txt");
        assert_eq!(provider.provide(&not_found()), None);
    }

    #[test]
    fn test_fixed_and_empty_providers() {
        assert_eq!(FixedTranscript("text".into()).provide(&not_found()).as_deref(), Some("text"));
        assert_eq!(NoManualTranscript.provide(&not_found()), None);
    }

    #[test]
    fn test_pasted_transcript_keeps_paragraph_breaks() {
        let input = "para one\n\npara two\n";
        assert_eq!(read_pasted_transcript(input.as_bytes()), "para one\n\npara two");
    }

    #[test]
    fn test_pasted_transcript_skips_leading_blank_lines() {
        assert_eq!(read_pasted_transcript("\n\ntext\n".as_bytes()), "text");
    }

    #[test]
    fn test_pasted_transcript_stops_at_end_marker() {
        let input = "first line\nsecond line\n.\nnot part of it\n";
        assert_eq!(read_pasted_transcript(input.as_bytes()), "first line\nsecond line");
        assert_eq!(read_pasted_transcript(" . \n".as_bytes()), "");
        assert_eq!(read_pasted_transcript("".as_bytes()), "");
    }
}
