use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::acquire::FallbackPolicy;
use crate::summarize::GeminiModel;

#[derive(Parser)]
#[command(
    name = "summarizer",
    about = "Video Summarizer - Summarize YouTube videos from their transcripts using Gemini",
    version,
    long_about = "Fetches the transcript of a YouTube video (or takes one you paste in), restores its punctuation through a punctuation service and asks a Gemini model for a brief summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a YouTube video
    Summarize {
        /// YouTube URL (or bare video id)
        #[arg(value_name = "URL")]
        url: String,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, value_name = "KEY")]
        api_key: Option<String>,

        /// Gemini model (defaults to the configured model)
        #[arg(short, long, value_enum)]
        model: Option<GeminiModel>,

        /// Proxy URI for transcript requests (http, https, socks5 or socks5h)
        #[arg(long, value_name = "URI")]
        proxy: Option<String>,

        /// Netscape-format cookie file for transcript requests
        #[arg(long, value_name = "FILE")]
        cookies: Option<PathBuf>,

        /// Read the transcript from this file if automatic fetching fails
        #[arg(long, value_name = "FILE", conflicts_with = "no_prompt")]
        transcript_file: Option<PathBuf>,

        /// Use this text as the transcript if automatic fetching fails
        #[arg(long, value_name = "TEXT", conflicts_with_all = ["transcript_file", "no_prompt"])]
        transcript_text: Option<String>,

        /// Never prompt for a transcript; fail instead
        #[arg(long)]
        no_prompt: bool,

        /// Which fetch failures fall back to manual entry (defaults to the configured policy)
        #[arg(long, value_enum)]
        fallback: Option<FallbackPolicy>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Include the punctuated transcript in markdown and text output
        #[arg(long)]
        show_transcript: bool,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },

    /// List supported Gemini models
    Models,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown summary
    Markdown,
    /// Plain text
    Text,
    /// JSON with metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
