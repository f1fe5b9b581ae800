//! Best-effort extraction of a recommendation from free-text model output.
//!
//! Each field has an ordered list of extractors. The first one that yields a
//! non-empty value wins, and every field ends in a fixed placeholder, so
//! parsing cannot fail.

use super::models::Recommendation;
use lazy_static::lazy_static;
use regex::Regex;

pub const UNKNOWN_TITLE: &str = "Unknown title";
pub const UNKNOWN_ARTIST: &str = "Unknown artist";
pub const MISSING_REASONING: &str = "Gemini did not explain the selection.";

/// Maximum number of vibe tags kept from a reply.
pub const MAX_VIBE_TAGS: usize = 6;

enum Extractor {
    /// First capture group of the pattern.
    Capture(Regex),
    /// Heuristic reconstruction over the whole text.
    Derived(fn(&str) -> Option<String>),
}

impl Extractor {
    fn apply(&self, text: &str) -> Option<String> {
        let value = match self {
            Extractor::Capture(regex) => regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string()),
            Extractor::Derived(derive) => derive(text),
        }?;
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

struct FieldRules {
    extractors: Vec<Extractor>,
    fallback: &'static str,
}

impl FieldRules {
    fn extract(&self, text: &str) -> String {
        self.extractors
            .iter()
            .find_map(|extractor| extractor.apply(text))
            .unwrap_or_else(|| self.fallback.to_string())
    }
}

fn capture(pattern: &str) -> Extractor {
    Extractor::Capture(Regex::new(pattern).unwrap())
}

lazy_static! {
    static ref TITLE_RULES: FieldRules = FieldRules {
        extractors: vec![
            capture(r#"(?i)(?:song|title)\s*[:-]\s*"?([^"\n]+)"?"#),
            capture(r#""([^"]+)""#),
        ],
        fallback: UNKNOWN_TITLE,
    };
    static ref ARTIST_RULES: FieldRules = FieldRules {
        extractors: vec![capture(r"(?i)artist\s*[:-]\s*([^\n]+)")],
        fallback: UNKNOWN_ARTIST,
    };
    static ref REASONING_RULES: FieldRules = FieldRules {
        extractors: vec![
            capture(r"(?i)(?:why(?:\sit)?\sfits|why)\s*[:-]\s*([^\n]+)"),
            Extractor::Derived(reasoning_from_body),
        ],
        fallback: MISSING_REASONING,
    };
    static ref VIBE_TAGS_LINE: Regex = Regex::new(r"(?im)vibe tags\s*[:-]\s*(.+)$").unwrap();
    static ref LEADING_ARTIST_LABEL: Regex = Regex::new(r"(?i)^artist\s*[:-]\s*").unwrap();
}

/// Drops the first non-empty line (usually the title) and joins the rest,
/// stripping any leading `artist:` label.
fn reasoning_from_body(text: &str) -> Option<String> {
    let body = text
        .split('\n')
        .map(|line| LEADING_ARTIST_LABEL.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    Some(body.trim().to_string())
}

/// Splits the `Vibe tags` line on commas or bars, keeping at most
/// [`MAX_VIBE_TAGS`] non-empty tags in reply order.
pub fn vibe_tags(text: &str) -> Vec<String> {
    let Some(line) = VIBE_TAGS_LINE.captures(text).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };
    line.as_str()
        .split([',', '|'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .take(MAX_VIBE_TAGS)
        .map(str::to_string)
        .collect()
}

/// Parses the reply text into a fully populated recommendation.
pub fn parse_reply(text: &str) -> Recommendation {
    Recommendation {
        title: TITLE_RULES.extract(text),
        artist: ARTIST_RULES.extract(text),
        reasoning: REASONING_RULES.extract(text),
        vibe_tags: vibe_tags(text),
        raw: text.to_string(),
    }
}
