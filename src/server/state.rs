use axum::extract::FromRef;

use crate::recommend::{RecommendError, RecommendationService};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::ServerConfig;

/// The recommendation service, or the reason it could not be built.
///
/// The server still starts without credentials; requests then get the
/// configuration error instead of a recommendation.
#[derive(Clone)]
pub enum RecommenderSlot {
    Ready(Arc<RecommendationService>),
    Misconfigured(String),
}

impl RecommenderSlot {
    pub fn from_result(result: Result<RecommendationService, RecommendError>) -> Self {
        match result {
            Ok(service) => RecommenderSlot::Ready(Arc::new(service)),
            Err(err) => RecommenderSlot::Misconfigured(err.to_string()),
        }
    }

    pub fn service(&self) -> Result<Arc<RecommendationService>, RecommendError> {
        match self {
            RecommenderSlot::Ready(service) => Ok(service.clone()),
            RecommenderSlot::Misconfigured(message) => {
                Err(RecommendError::Configuration(message.clone()))
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, RecommenderSlot::Ready(_))
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub recommender: RecommenderSlot,
    /// Cancelled on shutdown; every request runs under a child token.
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        recommender: RecommenderSlot,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            recommender,
            shutdown,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for RecommenderSlot {
    fn from_ref(input: &ServerState) -> Self {
        input.recommender.clone()
    }
}
