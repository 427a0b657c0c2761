use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::acquire::FallbackPolicy;
use crate::cli::OutputFormat;
use crate::routing::validate_proxy;
use crate::summarize::GeminiModel;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini summarization backend
    pub gemini: GeminiConfig,

    /// Punctuation restoration backend
    pub punctuation: PunctuationConfig,

    /// Transcript fetching
    pub transcript: TranscriptConfig,

    /// Default network routing
    pub network: NetworkConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API origin
    pub endpoint: String,

    /// Model used when none is given on the command line
    pub default_model: GeminiModel,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationConfig {
    /// Restoration service URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Caption languages in order of preference
    pub languages: Vec<String>,

    /// Which fetch failures fall back to manual entry
    pub fallback_policy: FallbackPolicy,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Proxy used when `--proxy` is not given
    pub proxy: Option<String>,

    /// Cookie file used when `--cookies` is not given
    pub cookie_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default output format
    pub default_output_format: OutputFormat,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            default_model: GeminiModel::default(),
            timeout_secs: 120,
        }
    }
}

impl Default for PunctuationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/restore".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            fallback_policy: FallbackPolicy::default(),
            timeout_secs: 30,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_output_format: OutputFormat::Markdown,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration if no file exists yet; returns its path
    pub fn init() -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            anyhow::bail!("Config file already exists: {}", config_path.display());
        }

        Self::default().save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("video-summarizer").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.gemini.endpoint)
            .with_context(|| format!("Invalid gemini.endpoint: {}", self.gemini.endpoint))?;

        Url::parse(&self.punctuation.endpoint)
            .with_context(|| format!("Invalid punctuation.endpoint: {}", self.punctuation.endpoint))?;

        if self.transcript.languages.iter().all(|lang| lang.trim().is_empty()) {
            anyhow::bail!("transcript.languages must list at least one language code");
        }

        if let Some(proxy) = &self.network.proxy {
            validate_proxy(proxy).context("Invalid network.proxy")?;
        }

        if self.gemini.timeout_secs == 0
            || self.punctuation.timeout_secs == 0
            || self.transcript.timeout_secs == 0
        {
            anyhow::bail!("Timeouts must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Gemini Endpoint: {}", self.gemini.endpoint);
        println!("  Default Model: {}", self.gemini.default_model);
        println!("  Punctuation Endpoint: {}", self.punctuation.endpoint);
        println!("  Transcript Languages: {}", self.transcript.languages.join(", "));
        println!("  Fallback Policy: {}", self.transcript.fallback_policy);
        if let Some(proxy) = &self.network.proxy {
            println!("  Proxy: {}", proxy);
        }
        if let Some(cookie_file) = &self.network.cookie_file {
            println!("  Cookie File: {}", cookie_file.display());
        }
        println!("  Default Format: {}", self.app.default_output_format);
    }
}
