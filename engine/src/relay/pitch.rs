//! Pitch Relay
//!
//! Drafts a short multi-message pitch for the best lead of the session.

use sdk::collaborator::Analyst;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::prompts::{fill, PITCH_PROMPT_TEMPLATE};
use super::{json_kind, parse_reply};
use crate::ranker::Lead;

/// Handle (with or without `@`) to the message bubbles for that handle
pub type PitchPlan = BTreeMap<String, Vec<String>>;

/// The product being pitched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub link: String,
    pub description: String,
}

#[derive(Serialize)]
struct Target<'a> {
    username: &'a str,
    conversation_history: &'a [String],
}

/// Fill the pitch prompt for one lead
pub fn pitch_prompt(product: &Product, lead: &Lead<'_>) -> String {
    let username = lead.record.display_label(lead.identity);
    let target = Target {
        username: &username,
        conversation_history: &lead.record.brief,
    };
    let target_json = serde_json::to_string_pretty(&target).unwrap_or_else(|_| "{}".to_string());

    fill(
        PITCH_PROMPT_TEMPLATE,
        &[
            ("product_name", product.name.as_str()),
            ("product_description", product.description.as_str()),
            ("product_link", product.link.as_str()),
            ("target_brief_json", target_json.as_str()),
            ("username", username.as_str()),
        ],
    )
}

/// Ask the analyst for a pitch aimed at `lead`
pub async fn draft(
    analyst: &dyn Analyst,
    product: &Product,
    lead: &Lead<'_>,
) -> Result<PitchPlan, EngineError> {
    tracing::info!(
        "Drafting pitch for @{} (spending {:.2}) via {}",
        lead.record.display_label(lead.identity),
        lead.score,
        analyst.name()
    );

    let reply = analyst.analyze(&pitch_prompt(product, lead)).await?;
    parse_pitch(&reply)
}

/// Parse a raw analyst reply into a pitch plan
pub fn parse_pitch(reply: &str) -> Result<PitchPlan, EngineError> {
    pitch_from_value(parse_reply(reply)?)
}

/// Validate a `{handle: [string, ...]}` object
pub fn pitch_from_value(value: serde_json::Value) -> Result<PitchPlan, EngineError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(EngineError::MalformedAiResponse(format!(
            "expected an object of handle -> messages, got {}",
            json_kind(&value)
        )));
    };

    let mut plan = PitchPlan::new();
    for (handle, messages) in entries {
        let serde_json::Value::Array(items) = messages else {
            return Err(EngineError::MalformedAiResponse(format!(
                "messages for '{}' must be an array, got {}",
                handle,
                json_kind(&messages)
            )));
        };

        let mut bubbles = Vec::with_capacity(items.len());
        for item in items {
            match item {
                serde_json::Value::String(text) => bubbles.push(text),
                other => {
                    return Err(EngineError::MalformedAiResponse(format!(
                        "message for '{}' must be a string, got {}",
                        handle,
                        json_kind(&other)
                    )))
                }
            }
        }
        plan.insert(handle, bubbles);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Counterpart;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn product() -> Product {
        Product {
            name: "Linen Tote".to_string(),
            link: "https://shop.example/tote".to_string(),
            description: "hand-stitched bag".to_string(),
        }
    }

    fn record() -> Counterpart {
        Counterpart {
            display_name: "ana".to_string(),
            brief: vec!["¿cuánto cuesta?".to_string(), "me encanta".to_string()],
            kpis: Default::default(),
        }
    }

    fn lead(record: &Counterpart) -> Lead<'_> {
        Lead {
            identity: "u1",
            record,
            display_name: &record.display_name,
            score: 0.9,
        }
    }

    #[test]
    fn test_prompt_contents() {
        let record = record();
        let prompt = pitch_prompt(&product(), &lead(&record));

        assert!(prompt.contains("**Product:** Linen Tote (hand-stitched bag)"));
        assert!(prompt.contains("**Link:** https://shop.example/tote"));
        assert!(prompt.contains(r#""username": "ana""#));
        assert!(prompt.contains(r#""conversation_history": ["#));
        assert!(prompt.contains("¿cuánto cuesta?"));
        assert!(prompt.contains(r#"Example: `{"@ana": ["Hey! 👋""#));
        assert!(prompt.contains(r#""https://shop.example/tote"]}`"#));
        assert!(!prompt.contains("{username}"));
    }

    #[test]
    fn test_parse_pitch() {
        let plan = parse_pitch(r#"{"@ana": ["hola!", "mira esto: https://shop.example/tote"]}"#)
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan["@ana"].len(), 2);
    }

    #[test]
    fn test_parse_pitch_rejects_bad_shapes() {
        for reply in [
            r#"["hola"]"#,
            r#"{"@ana": "hola"}"#,
            r#"{"@ana": ["hola", 3]}"#,
            "hola!",
        ] {
            assert!(
                matches!(parse_pitch(reply), Err(EngineError::MalformedAiResponse(_))),
                "reply should be rejected: {}",
                reply
            );
        }
    }

    struct RecordingAnalyst {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    #[async_trait]
    impl Analyst for RecordingAnalyst {
        fn name(&self) -> &str {
            "recording"
        }

        async fn analyze(&self, prompt: &str) -> Result<String, EngineError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_draft_sends_prompt_and_parses_reply() {
        let analyst = RecordingAnalyst {
            prompts: Mutex::new(Vec::new()),
            reply: "```json\n{\"@ana\": [\"hola!\"]}\n```".to_string(),
        };
        let record = record();

        let plan = draft(&analyst, &product(), &lead(&record)).await.unwrap();
        assert_eq!(plan["@ana"], vec!["hola!".to_string()]);

        let prompts = analyst.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Linen Tote"));
    }
}
