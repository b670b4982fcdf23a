//! Analyst relays
//!
//! Both relays follow the same shape: fill a prompt template, hand it to the
//! [`Analyst`](sdk::Analyst), parse the reply as JSON, and check it has the
//! expected shape before anything touches the session cache. There are no
//! retries; a bad reply aborts the command with `MalformedAiResponse`.

pub mod pitch;
pub mod prompts;
pub mod scoring;

pub use pitch::{PitchPlan, Product};
pub use scoring::ScoreSet;

use sdk::errors::EngineError;

/// Parse an analyst reply as JSON
///
/// Accepts bare JSON or a single markdown code fence around it (with or
/// without prose after the closing fence). Anything else is malformed.
pub fn parse_reply(reply: &str) -> Result<serde_json::Value, EngineError> {
    let trimmed = reply.trim();
    let body = if trimmed.starts_with("```") {
        extract_fenced_json(trimmed).unwrap_or(trimmed)
    } else {
        trimmed
    };

    serde_json::from_str(body.trim()).map_err(|e| EngineError::MalformedAiResponse(e.to_string()))
}

/// Extract the body of the first markdown code fence in the text.
///
/// Works even when there is trailing prose after the closing ```.
/// Returns `None` if no fenced block is found.
fn extract_fenced_json(content: &str) -> Option<&str> {
    // Find opening fence
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    // Find closing fence after the body starts
    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

/// Short description of a JSON value's type, for shape errors
fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_json() {
        let value = parse_reply(r#"  {"u1": {"spending": 0.8}}  "#).unwrap();
        assert_eq!(value, json!({"u1": {"spending": 0.8}}));
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "```json\n{\"u1\": {\"spending\": 0.8}}\n```";
        assert_eq!(parse_reply(reply).unwrap(), json!({"u1": {"spending": 0.8}}));
    }

    #[test]
    fn test_parse_fenced_json_with_trailing_prose() {
        let reply = "```\n[\"a\"]\n```\nLet me know if you need more.";
        assert_eq!(parse_reply(reply).unwrap(), json!(["a"]));
    }

    #[test]
    fn test_prose_is_malformed() {
        match parse_reply("Sure! Here are the scores: none") {
            Err(EngineError::MalformedAiResponse(msg)) => assert!(msg.contains("line 1")),
            other => panic!("expected MalformedAiResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_reply_is_malformed() {
        assert!(matches!(
            parse_reply("   "),
            Err(EngineError::MalformedAiResponse(_))
        ));
    }

    #[test]
    fn test_extract_fenced_json_requires_body() {
        assert_eq!(extract_fenced_json("```json\n```"), None);
        assert_eq!(extract_fenced_json("no fence"), None);
    }
}
