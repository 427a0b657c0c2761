use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::SummaryArtifact;

/// Save a summary to file
pub fn save_to_file(
    artifact: &SummaryArtifact,
    path: &Path,
    format: OutputFormat,
    include_transcript: bool,
) -> Result<()> {
    let content = render(artifact, format, include_transcript)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a summary to console
pub fn print_to_console(artifact: &SummaryArtifact, format: OutputFormat, include_transcript: bool) -> Result<()> {
    let content = render(artifact, format, include_transcript)?;
    println!("{}", content);
    Ok(())
}

/// Render a summary in the requested format; JSON always carries the transcript
pub fn render(artifact: &SummaryArtifact, format: OutputFormat, include_transcript: bool) -> Result<String> {
    let rendered = match format {
        OutputFormat::Markdown => format_as_markdown(artifact, include_transcript),
        OutputFormat::Text => format_as_text(artifact, include_transcript),
        OutputFormat::Json => serde_json::to_string_pretty(artifact)?,
    };
    Ok(rendered)
}

fn format_as_markdown(artifact: &SummaryArtifact, include_transcript: bool) -> String {
    let mut out = format!(
        "# Summary\n\n{}\n\n_Video `{}` · {} · {} transcript ({} words)_\n",
        artifact.content.trim(),
        artifact.video_id,
        artifact.model,
        artifact.transcript_origin,
        artifact.word_count,
    );

    if include_transcript {
        out.push_str("\n## Full punctuated transcript\n\n");
        out.push_str(artifact.transcript.trim());
        out.push('\n');
    }

    out
}

fn format_as_text(artifact: &SummaryArtifact, include_transcript: bool) -> String {
    let mut out = format!("SUMMARY\n\n{}\n", artifact.content.trim());

    if include_transcript {
        out.push_str("\nTRANSCRIPT\n\n");
        out.push_str(artifact.transcript.trim());
        out.push('\n');
    }

    out
}
