//! Normalizing the conversational agent's reply.
//!
//! Serving deployments disagree on response shape: some wrap an agent output
//! object in `predictions`, some return a predictions list, some speak the
//! OpenAI chat-completions shape, some return bare `content` or `text`. The
//! extractor tries each known shape in priority order and, when none matches,
//! returns a truncated debug dump so the frontend always has something to
//! render.

use serde_json::Value;

const DEBUG_DUMP_LIMIT: usize = 1000;

/// Extract the assistant's message from a raw agent response.
///
/// Never fails and never returns an empty string.
pub fn normalize(raw: &Value) -> String {
    if let Some(text) = predictions_object(raw) {
        return text;
    }
    if let Some(text) = predictions_list(raw) {
        return text;
    }
    if let Some(text) = openai_choices(raw) {
        return text;
    }
    if let Some(text) = raw.get("content").and_then(Value::as_str) {
        return text.to_string();
    }
    if let Some(text) = raw.get("text").and_then(Value::as_str) {
        return text.to_string();
    }
    debug_dump(raw)
}

/// Shape 1: `predictions` object wrapping an agent output,
/// `predictions.output[0].content[0].text`.
fn predictions_object(raw: &Value) -> Option<String> {
    raw.get("predictions")?
        .as_object()?
        .get("output")?
        .as_array()?
        .first()?
        .get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// Shape 2: `predictions` list; the first element is either the message
/// itself or an object with one of several well-known keys.
fn predictions_list(raw: &Value) -> Option<String> {
    let first = raw.get("predictions")?.as_array()?.first()?;
    match first {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => {
            for key in ["content", "text"] {
                if let Some(text) = obj.get(key).and_then(Value::as_str) {
                    return Some(text.to_string());
                }
            }
            if let Some(message) = obj.get("message") {
                return Some(
                    message
                        .get("content")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| message.to_string()),
                );
            }
            for key in ["output", "response"] {
                if let Some(text) = obj.get(key).and_then(Value::as_str) {
                    return Some(text.to_string());
                }
            }
            Some(first.to_string())
        }
        other => Some(other.to_string()),
    }
}

/// Shape 3: OpenAI chat completions, `choices[0].message.content`.
fn openai_choices(raw: &Value) -> Option<String> {
    let choice = raw.get("choices")?.as_array()?.first()?;
    match choice.get("message").and_then(|m| m.get("content")).and_then(Value::as_str) {
        Some(text) => Some(text.to_string()),
        None => Some(choice.to_string()),
    }
}

/// Last resort: a truncated dump of whatever arrived.
fn debug_dump(raw: &Value) -> String {
    let mut dump = raw.to_string();
    if dump.len() > DEBUG_DUMP_LIMIT {
        // Truncate on a char boundary.
        let mut cut = DEBUG_DUMP_LIMIT;
        while !dump.is_char_boundary(cut) {
            cut -= 1;
        }
        dump.truncate(cut);
    }
    format!("Debug: full response: {dump}")
}
