//! Reading feedback text out of a chat-completion response body.
//!
//! The standard shape is `choices[0].message.content` as a string. Providers
//! behind the router occasionally drift from it, so a short ordered list of
//! alternative readers is tried after the standard one; every recovery is
//! logged as a warning.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::LlmError;

/// Tries to read the feedback text from a response body.
pub type ShapeStrategy = fn(&Value) -> Option<String>;

/// Tried in order; the first entry is the standard OpenAI shape.
pub const SHAPE_STRATEGIES: &[(&str, ShapeStrategy)] = &[
    ("message_content", message_content as ShapeStrategy),
    ("message_content_parts", message_content_parts as ShapeStrategy),
    ("legacy_choice_text", legacy_choice_text as ShapeStrategy),
];

/// Token accounting; providers often report only some of the counters.
#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Returns the first choice's message content verbatim.
pub fn extract_message_content(body: &Value) -> Result<String, LlmError> {
    if let Some(err) = embedded_error(body) {
        return Err(err);
    }

    for (index, (name, strategy)) in SHAPE_STRATEGIES.iter().enumerate() {
        if let Some(content) = strategy(body) {
            if index > 0 {
                warn!("Chat completion response had a non-standard shape; read it via '{name}'");
            }
            return Ok(content);
        }
    }

    warn!("Chat completion response matched no known shape: {body}");
    Err(LlmError::UnexpectedShape(
        "expected choices[0].message.content".to_string(),
    ))
}

fn message_content(body: &Value) -> Option<String> {
    let content = body
        .pointer("/choices/0/message/content")?
        .as_str()?
        .to_string();
    log_usage(body);
    Some(content)
}

fn log_usage(body: &Value) {
    if let Some(usage) = body.get("usage").and_then(|u| Usage::deserialize(u).ok()) {
        debug!(
            "Chat completion usage: prompt_tokens={:?}, completion_tokens={:?}, total_tokens={:?}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
}

/// `content` given as an array of `{ "type": "text", "text": ... }` parts.
fn message_content_parts(body: &Value) -> Option<String> {
    let parts = body
        .pointer("/choices/0/message/content")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>();
    if parts.is_empty() {
        return None;
    }
    Some(parts.concat())
}

/// Text-completion style `choices[0].text`.
fn legacy_choice_text(body: &Value) -> Option<String> {
    body.pointer("/choices/0/text")
        .and_then(Value::as_str)
        .map(String::from)
}

/// OpenRouter can answer 200 with an `error` object instead of choices.
fn embedded_error(body: &Value) -> Option<LlmError> {
    if body.get("choices").is_some() {
        return None;
    }
    let error = body.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let status = error
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(200);
    Some(LlmError::Api { status, message })
}
