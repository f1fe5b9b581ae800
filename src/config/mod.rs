mod file_config;

pub use file_config::{FileConfig, GeminiConfig, RetryConfig};

use crate::gemini::DEFAULT_GEMINI_BASE_URL;
use crate::recommend::{
    RecommendError, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKOFF_MS,
};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;

/// Environment variables holding the API key, in lookup order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];
/// Environment variables holding the model identifier, in lookup order.
pub const MODEL_VARS: [&str; 2] = ["GEMINI_MODEL", "VITE_GEMINI_MODEL"];

pub const DEFAULT_UPSTREAM_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub upstream_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            bind_address: "127.0.0.1".to_string(),
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
            upstream_timeout_sec: DEFAULT_UPSTREAM_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    pub gemini: GeminiSettings,
    pub retry: RetrySettings,
}

/// Upstream settings. Credentials stay optional here; a missing one only
/// becomes an error when a recommendation is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: String,
    pub timeout_sec: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_sec: DEFAULT_UPSTREAM_TIMEOUT_SEC,
        }
    }
}

impl GeminiSettings {
    /// Reads the credentials from the environment only.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: first_non_empty(&API_KEY_VARS, &env),
            model: first_non_empty(&MODEL_VARS, &env),
            ..Default::default()
        }
    }

    /// Returns `(api_key, model)`, or a configuration error naming the
    /// missing setting. The key is checked first.
    pub fn credentials(&self) -> Result<(String, String), RecommendError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| missing_setting(API_KEY_VARS[0]))?;
        let model = self
            .model
            .clone()
            .ok_or_else(|| missing_setting(MODEL_VARS[0]))?;
        Ok((api_key, model))
    }
}

fn missing_setting(name: &str) -> RecommendError {
    RecommendError::Configuration(format!(
        "Server is missing {}. Set it in your environment or deployment settings.",
        name
    ))
}

/// First variable whose trimmed value is non-empty.
fn first_non_empty(names: &[&str], env: &impl Fn(&str) -> Option<String>) -> Option<String> {
    names.iter().find_map(|name| non_empty(env(name)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

impl RetrySettings {
    fn validate(&self) -> Result<()> {
        if self.max_attempts < 1 {
            bail!("retry.max_attempts must be at least 1");
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            bail!(
                "retry.backoff_multiplier must be at least 1.0, got {}",
                self.backoff_multiplier
            );
        }
        Ok(())
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, an optional TOML file config
    /// and the environment.
    /// TOML values override CLI values where present; environment credentials
    /// override the TOML `[gemini]` ones.
    pub fn resolve(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {:?}", s),
            },
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let gemini_file = file.gemini.unwrap_or_default();
        let from_env = GeminiSettings::from_lookup(env);
        let gemini = GeminiSettings {
            api_key: from_env.api_key.or_else(|| non_empty(gemini_file.api_key)),
            model: from_env.model.or_else(|| non_empty(gemini_file.model)),
            base_url: non_empty(gemini_file.base_url)
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout_sec: gemini_file.timeout_sec.unwrap_or(cli.upstream_timeout_sec),
        };
        if gemini.timeout_sec < 1 {
            bail!("gemini.timeout_sec must be at least 1");
        }

        let retry_file = file.retry.unwrap_or_default();
        let defaults = RetrySettings::default();
        let retry = RetrySettings {
            max_attempts: retry_file.max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff_ms: retry_file
                .initial_backoff_ms
                .unwrap_or(defaults.initial_backoff_ms),
            backoff_multiplier: retry_file
                .backoff_multiplier
                .unwrap_or(defaults.backoff_multiplier),
            max_backoff_ms: retry_file.max_backoff_ms.unwrap_or(defaults.max_backoff_ms),
        };
        retry.validate()?;

        Ok(Self {
            port,
            bind_address,
            logging_level,
            frontend_dir_path,
            gemini,
            retry,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
