//! Gemini `generateContent` client.

use super::provider::{GenerationOptions, TextGenerator, UpstreamResponse};
use super::types::GenerateContentRequest;
use crate::recommend::RecommendError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Default endpoint prefix; the model name and `:generateContent` are appended.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    /// * `base_url` - Models endpoint (e.g., [`DEFAULT_GEMINI_BASE_URL`]).
    /// * `model` - Model to use (e.g., "gemini-2.5-flash").
    /// * `api_key` - API key, sent as the `key` query parameter.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<UpstreamResponse, RecommendError> {
        let request = GenerateContentRequest::from_prompt(prompt, options.generation_config());

        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecommendError::network("Gemini did not answer in time. Try again.")
                } else {
                    RecommendError::network(format!("Could not reach Gemini: {}", e.without_url()))
                }
            })?;

        let status = response.status().as_u16();
        // A body that is not JSON is reported as absent; the classifier decides what that means.
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice(&bytes).ok(),
            Err(e) => {
                debug!(status, error = %e, "Failed to read generateContent body");
                None
            }
        };

        debug!(status, has_body = body.is_some(), "Received generateContent response");

        Ok(UpstreamResponse { status, body })
    }
}
