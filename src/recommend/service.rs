//! Recommendation service: prompt, upstream call, classification, parsing.

use super::classifier::classify;
use super::error::RecommendError;
use super::models::{MoodRequest, Recommendation};
use super::parser::parse_reply;
use super::prompt::build_prompt;
use super::retry::RetryPolicy;
use crate::config::GeminiSettings;
use crate::gemini::{GeminiClient, GenerationOptions, TextGenerator};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct RecommendationService {
    generator: Arc<dyn TextGenerator>,
    retry_policy: RetryPolicy,
    options: GenerationOptions,
}

impl RecommendationService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        retry_policy: RetryPolicy,
        options: GenerationOptions,
    ) -> Self {
        Self {
            generator,
            retry_policy,
            options,
        }
    }

    /// Builds a service backed by the Gemini API.
    ///
    /// Fails with [`RecommendError::Configuration`] when the API key or the
    /// model is missing.
    pub fn from_settings(
        settings: &GeminiSettings,
        retry_policy: RetryPolicy,
    ) -> Result<Self, RecommendError> {
        let (api_key, model) = settings.credentials()?;
        let client = GeminiClient::new(settings.base_url.clone(), model, api_key);
        let options = GenerationOptions {
            timeout: Duration::from_secs(settings.timeout_sec),
            ..Default::default()
        };
        Ok(Self::new(Arc::new(client), retry_policy, options))
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub async fn recommend(
        &self,
        request: &MoodRequest,
        cancel: &CancellationToken,
    ) -> Result<Recommendation, RecommendError> {
        let prompt = build_prompt(request);
        let prompt = prompt.as_str();

        let attempted = self
            .retry_policy
            .run(cancel, move || self.attempt(prompt))
            .await;

        match &attempted.result {
            Ok(recommendation) => info!(
                backend = self.generator.name(),
                model = self.generator.model(),
                attempts = attempted.attempts,
                title = %recommendation.title,
                "Recommendation ready"
            ),
            Err(error) => info!(
                backend = self.generator.name(),
                model = self.generator.model(),
                attempts = attempted.attempts,
                status = error.status_code(),
                "Recommendation failed: {}",
                error
            ),
        }

        attempted.into_result()
    }

    /// One full upstream cycle: call, classify, parse.
    async fn attempt(&self, prompt: &str) -> Result<Recommendation, RecommendError> {
        let response = self.generator.generate(prompt, &self.options).await?;
        let text = classify(&response)?;
        debug!(reply_chars = text.len(), "Parsing model reply");
        Ok(parse_reply(&text))
    }
}
