//! Turns a raw upstream response into reply text or a classified error.

use super::error::RecommendError;
use crate::gemini::{
    GenerateContentResponse, UpstreamResponse, FINISH_REASON_MAX_TOKENS, FINISH_REASON_STOP,
};

/// Inspects one upstream response. Checks run in a fixed order: HTTP status,
/// prompt block, missing candidates, then empty text (finish reason before
/// safety ratings).
pub fn classify(response: &UpstreamResponse) -> Result<String, RecommendError> {
    let status = response.status;

    if !(200..300).contains(&status) {
        let message = response
            .body
            .as_ref()
            .and_then(|body| body.pointer("/error/message"))
            .and_then(|message| message.as_str())
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Gemini request failed ({})", status));
        return Err(RecommendError::upstream(status, message));
    }

    let reply: GenerateContentResponse = response
        .body
        .clone()
        .and_then(|body| serde_json::from_value(body).ok())
        .unwrap_or_default();

    if let Some(reason) = reply
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(RecommendError::ContentPolicy(format!(
            "Gemini blocked the request ({}). Try a different description.",
            reason
        )));
    }

    let Some(candidate) = reply.candidates.as_deref().and_then(|c| c.first()) else {
        return Err(RecommendError::EmptyResult(
            "Gemini did not return any candidates. Try again.".to_string(),
        ));
    };

    let text = candidate.text();
    if !text.is_empty() {
        return Ok(text);
    }

    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|reason| !reason.eq_ignore_ascii_case(FINISH_REASON_STOP))
    {
        let message = if reason.eq_ignore_ascii_case(FINISH_REASON_MAX_TOKENS) {
            "Gemini ran out of room before finishing the recommendation. Try a shorter mood description.".to_string()
        } else {
            format!(
                "Gemini stopped before answering ({}). Reword the mood description.",
                reason
            )
        };
        return Err(RecommendError::StoppedEarly(message));
    }

    if let Some(category) = candidate.blocked_category() {
        return Err(RecommendError::ContentPolicy(format!(
            "Gemini blocked part of the response ({}). Reword the mood description.",
            category
        )));
    }

    Err(RecommendError::EmptyResult(
        "Gemini returned an empty response. Try again.".to_string(),
    ))
}
