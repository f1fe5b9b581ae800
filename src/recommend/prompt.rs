//! Prompt construction.

use super::models::MoodRequest;

/// Word budget the model is asked to stay under.
pub const WORD_BUDGET: usize = 60;

/// Placeholder used in the artist preference line when no artist was given.
pub const NO_ARTIST_PLACEHOLDER: &str = "None";

/// Builds the instruction-and-data prompt for a mood request.
///
/// The output template (`Song`, `Artist`, `Why`, `Vibe tags`) is what
/// [`super::parser::parse_reply`] expects back.
pub fn build_prompt(request: &MoodRequest) -> String {
    format!(
        "You are Moodwave, a concise music curator.\n\
         Return exactly one song that matches the vibe in a tight, minimalist format.\n\
         \n\
         Constraints:\n\
         - Keep the entire reply under {budget} words.\n\
         - Prioritize the supplied artist only if it still fits the mood.\n\
         - Use this exact structure with no extra sentences:\n\
         Song: \"<title>\"\n\
         Artist: <artist>\n\
         Why: <one short sentence>\n\
         Vibe tags: <comma-separated keywords>\n\
         \n\
         Mood: {mood}\n\
         Artist preference: {artist}",
        budget = WORD_BUDGET,
        mood = request.mood(),
        artist = request.artist().unwrap_or(NO_ARTIST_PLACEHOLDER),
    )
}
