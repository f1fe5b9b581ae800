//! Mood to song recommendation pipeline.

mod classifier;
mod error;
mod models;
mod parser;
mod prompt;
mod retry;
mod service;

pub use classifier::classify;
pub use error::{ClassifiedError, RecommendError, RETRIABLE_STATUS_CODES};
pub use models::{MoodRequest, Recommendation};
pub use parser::{parse_reply, vibe_tags};
pub use prompt::build_prompt;
pub use retry::{
    Attempted, RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_MS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF_MS,
};
pub use service::RecommendationService;
