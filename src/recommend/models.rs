//! Request and result types for a single recommendation.

use super::error::RecommendError;
use serde::{Deserialize, Serialize};

/// A validated mood request. The mood is never blank, the artist may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodRequest {
    mood: String,
    artist: String,
}

impl MoodRequest {
    pub fn new(mood: &str, artist: Option<&str>) -> Result<Self, RecommendError> {
        let mood = mood.trim();
        if mood.is_empty() {
            return Err(RecommendError::Validation("Mood is required.".to_string()));
        }
        Ok(Self {
            mood: mood.to_string(),
            artist: artist.map(str::trim).unwrap_or_default().to_string(),
        })
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    /// The artist hint, `None` when the caller left it empty.
    pub fn artist(&self) -> Option<&str> {
        if self.artist.is_empty() {
            None
        } else {
            Some(&self.artist)
        }
    }
}

/// A structured song recommendation extracted from the model's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub artist: String,
    pub reasoning: String,
    pub vibe_tags: Vec<String>,
    /// The full reply text the fields were extracted from.
    pub raw: String,
}
