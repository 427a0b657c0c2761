use anyhow::Result;
use clap::Parser;
use console::style;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_summarizer::acquire::{
    ConsolePrompt, FileTranscript, FixedTranscript, ManualTranscriptProvider, NoManualTranscript,
};
use video_summarizer::routing::{CookieSource, RoutingRequest};
use video_summarizer::summarize::GeminiModel;
use video_summarizer::{output, utils, Cli, Commands, Config, PipelineRequest, SummaryPipeline};

fn init_tracing(cli: &Cli) {
    let default_filter = if cli.verbose {
        "video_summarizer=debug,summarizer=debug"
    } else {
        "video_summarizer=warn,summarizer=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Summarize {
            url,
            api_key,
            model,
            proxy,
            cookies,
            transcript_file,
            transcript_text,
            no_prompt,
            fallback,
            output,
            format,
            show_transcript,
        } => {
            let policy = fallback.unwrap_or(config.transcript.fallback_policy);
            let pipeline = SummaryPipeline::from_config(&config, policy)?.with_progress(!cli.quiet);

            let request = PipelineRequest {
                url,
                api_key: api_key.unwrap_or_default(),
                model: model.unwrap_or(config.gemini.default_model),
                routing: RoutingRequest::new(
                    proxy.or_else(|| config.network.proxy.clone()),
                    cookies
                        .or_else(|| config.network.cookie_file.clone())
                        .map(CookieSource::Path),
                ),
            };

            let provider: Box<dyn ManualTranscriptProvider> = match (transcript_file, transcript_text, no_prompt) {
                (Some(path), _, _) => Box::new(FileTranscript::new(path)),
                (None, Some(text), _) => Box::new(FixedTranscript(text)),
                (None, None, true) => Box::new(NoManualTranscript),
                (None, None, false) => Box::new(ConsolePrompt::new()),
            };

            tracing::info!("Starting summarization for: {}", request.url);
            let started = Instant::now();

            let artifact = match pipeline.run(request, provider.as_ref()).await {
                Ok(artifact) => artifact,
                Err(failure) => {
                    if let Some(hint) = failure.remediation() {
                        eprintln!("  {} {}", style("hint:").yellow(), hint);
                    }
                    return Err(failure.into());
                }
            };

            let format = format.unwrap_or(config.app.default_output_format);
            match output {
                Some(path) => {
                    output::save_to_file(&artifact, &path, format, show_transcript)?;
                    println!("Summary saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&artifact, format, show_transcript)?;
                }
            }

            if !cli.quiet {
                eprintln!(
                    "{} Done in {}",
                    style("✓").green(),
                    utils::format_duration(started.elapsed().as_secs_f64())
                );
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::init()?;
                println!("Wrote default configuration to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Config file location:");
                println!("  {}", Config::config_path()?.display());
                println!("Run with --show to print it or --init to create it.");
            }
        }
        Commands::Models => {
            println!("Supported Gemini models:");
            for model in GeminiModel::ALL {
                let marker = if model == config.gemini.default_model { " (default)" } else { "" };
                println!("  • {} - {}{}", model, model.description(), marker);
            }
        }
    }

    Ok(())
}
