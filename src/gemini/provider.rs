//! Text generation trait definition.

use super::types::GenerationConfig;
use crate::recommend::RecommendError;
use async_trait::async_trait;
use std::time::Duration;

/// Options for a generation request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl GenerationOptions {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
            max_output_tokens: 2048,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Raw outcome of one upstream call: the HTTP status and the decoded JSON body,
/// if the body was JSON at all. Nothing has been interpreted yet.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

/// Trait for text generation backends.
///
/// Implementations only report transport failures as errors. Any HTTP answer,
/// successful or not, comes back as an [`UpstreamResponse`] for the classifier.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Get the backend's name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Send one prompt and return the raw response.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<UpstreamResponse, RecommendError>;
}
