//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server pointed at its own fake upstream.

use super::constants::*;
use super::upstream::FakeGemini;
use moodwave_server::config::GeminiSettings;
use moodwave_server::recommend::{RecommendationService, RetryPolicy};
use moodwave_server::server::{serve, RecommenderSlot, RequestsLoggingLevel, ServerConfig};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Test server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    shutdown: CancellationToken,
}

/// Retry policy with the production attempt budget and short waits
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        initial_backoff_ms: TEST_INITIAL_BACKOFF_MS,
        max_backoff_ms: TEST_MAX_BACKOFF_MS,
        ..RetryPolicy::default()
    }
}

/// Retry policy whose first backoff outlasts any test
pub fn slow_retry_policy() -> RetryPolicy {
    RetryPolicy {
        initial_backoff_ms: SLOW_INITIAL_BACKOFF_MS,
        max_backoff_ms: SLOW_INITIAL_BACKOFF_MS,
        ..RetryPolicy::default()
    }
}

impl TestServer {
    /// Spawns a server that talks to `gemini`
    pub async fn spawn(gemini: &FakeGemini) -> Self {
        Self::spawn_with_policy(gemini, fast_retry_policy()).await
    }

    /// Spawns a server that talks to `gemini` and retries with `retry_policy`
    pub async fn spawn_with_policy(gemini: &FakeGemini, retry_policy: RetryPolicy) -> Self {
        let settings = GeminiSettings {
            api_key: Some(TEST_API_KEY.to_string()),
            model: Some(TEST_MODEL.to_string()),
            base_url: gemini.base_url.clone(),
            timeout_sec: REQUEST_TIMEOUT_SECS,
        };
        let service = RecommendationService::from_settings(&settings, retry_policy)
            .expect("Failed to build recommendation service");

        Self::spawn_with(RecommenderSlot::Ready(std::sync::Arc::new(service))).await
    }

    /// Spawns a server whose upstream port refuses connections
    pub async fn spawn_unreachable() -> Self {
        let closed = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = closed
            .local_addr()
            .expect("Failed to get local address")
            .port();
        drop(closed);

        let settings = GeminiSettings {
            api_key: Some(TEST_API_KEY.to_string()),
            model: Some(TEST_MODEL.to_string()),
            base_url: format!("http://127.0.0.1:{}/v1beta/models", port),
            timeout_sec: REQUEST_TIMEOUT_SECS,
        };
        let service = RecommendationService::from_settings(&settings, fast_retry_policy())
            .expect("Failed to build recommendation service");

        Self::spawn_with(RecommenderSlot::Ready(std::sync::Arc::new(service))).await
    }

    /// Spawns a server whose Gemini settings lack `GEMINI_API_KEY`
    pub async fn spawn_misconfigured() -> Self {
        let settings = GeminiSettings {
            model: Some(TEST_MODEL.to_string()),
            ..Default::default()
        };
        let recommender = RecommenderSlot::from_result(RecommendationService::from_settings(
            &settings,
            fast_retry_policy(),
        ));

        Self::spawn_with(recommender).await
    }

    /// Binds to a random port, spawns the server in a background task and
    /// waits for it to answer.
    pub async fn spawn_with(recommender: RecommenderSlot) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };

        let shutdown = CancellationToken::new();
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            serve(listener, config, recommender, server_shutdown)
                .await
                .expect("Server failed");
        });

        let server = Self { base_url, shutdown };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Cancels the shutdown token, as Ctrl+C would
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
