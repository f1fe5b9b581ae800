use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodwave_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_UPSTREAM_TIMEOUT_SEC};
use moodwave_server::recommend::{MoodRequest, RecommendationService, RetryPolicy};

/// Ask Gemini for one song that fits a mood.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Free-text description of the mood.
    pub mood: String,

    /// Preferred artist, used only if it still fits the mood.
    #[clap(short, long)]
    pub artist: Option<String>,

    /// Path to TOML configuration file, same format as the server's.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Timeout in seconds for a single Gemini request.
    #[clap(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SEC)]
    pub upstream_timeout_sec: u64,

    /// Print the recommendation as JSON instead of text.
    #[clap(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        upstream_timeout_sec: cli_args.upstream_timeout_sec,
        ..Default::default()
    };
    let app_config = AppConfig::resolve(&cli_config, file_config, |name| std::env::var(name).ok())?;

    let request = MoodRequest::new(&cli_args.mood, cli_args.artist.as_deref())?;
    let service =
        RecommendationService::from_settings(&app_config.gemini, RetryPolicy::new(&app_config.retry))?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let recommendation = match service.recommend(&request, &cancel).await {
        Ok(recommendation) => recommendation,
        Err(err) => bail!("{} (status {})", err, err.status_code()),
    };

    if cli_args.json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    println!("{} - {}", recommendation.title, recommendation.artist);
    println!("{}", recommendation.reasoning);
    if !recommendation.vibe_tags.is_empty() {
        println!("[{}]", recommendation.vibe_tags.join("] ["));
    }
    Ok(())
}
