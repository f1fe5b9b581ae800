//! Upstream text generation.
//!
//! A trait-based seam over the Gemini `generateContent` API so that the
//! recommendation service can run against a scripted backend in tests.

mod client;
mod provider;
mod types;

pub use client::{GeminiClient, DEFAULT_GEMINI_BASE_URL};
pub use provider::{GenerationOptions, TextGenerator, UpstreamResponse};
pub use types::{
    Candidate, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    FINISH_REASON_MAX_TOKENS, FINISH_REASON_STOP,
};
