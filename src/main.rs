use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodwave_server::config::{self, DEFAULT_UPSTREAM_TIMEOUT_SEC};
use moodwave_server::recommend::{RecommendationService, RetryPolicy};
use moodwave_server::server::{run_server, RecommenderSlot, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Timeout in seconds for a single Gemini request.
    #[clap(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SEC)]
    pub upstream_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            bind_address: args.bind_address.clone(),
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            upstream_timeout_sec: args.upstream_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI, environment overrides credentials)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config =
        config::AppConfig::resolve(&cli_config, file_config, |name| std::env::var(name).ok())?;

    info!("Configuration loaded:");
    info!("  bind: {}:{}", app_config.bind_address, app_config.port);
    info!("  logging_level: {}", app_config.logging_level);
    info!("  gemini base_url: {}", app_config.gemini.base_url);
    info!("  gemini timeout: {}s", app_config.gemini.timeout_sec);
    info!(
        "  retry: {} attempts, {}ms initial backoff, x{}, {}ms cap",
        app_config.retry.max_attempts,
        app_config.retry.initial_backoff_ms,
        app_config.retry.backoff_multiplier,
        app_config.retry.max_backoff_ms
    );
    if let Some(frontend) = &app_config.frontend_dir_path {
        info!("  frontend_dir_path: {}", frontend);
    }

    let retry_policy = RetryPolicy::new(&app_config.retry);
    let recommender = RecommenderSlot::from_result(RecommendationService::from_settings(
        &app_config.gemini,
        retry_policy,
    ));
    match &recommender {
        RecommenderSlot::Ready(service) => info!("  gemini model: {}", service.model()),
        RecommenderSlot::Misconfigured(reason) => {
            warn!("{} Recommendations will fail until this is fixed.", reason)
        }
    }

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating graceful shutdown");
                signal_token.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let result = run_server(app_config.server_config(), recommender, shutdown_token.clone()).await;
    info!("HTTP server stopped: {:?}", result);
    shutdown_token.cancel();
    result
}
