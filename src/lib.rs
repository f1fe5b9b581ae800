//! Moodwave Server Library
//!
//! Turns a free-text mood into one song recommendation using the Gemini
//! `generateContent` API. Exposes the internal modules for testing and the
//! terminal client.

pub mod config;
pub mod gemini;
pub mod recommend;
pub mod server;

// Re-export commonly used types for convenience
pub use recommend::{MoodRequest, RecommendError, Recommendation, RecommendationService};
pub use server::{run_server, RequestsLoggingLevel};
