//! Prompt templates handed to the analyst
//!
//! Placeholders are `{name}` tokens filled by plain substitution, so literal
//! braces in the templates need no escaping.

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"
Analyze each user brief. For each user_id, return a minified JSON object with values for these KPIs: {kpi_list}.
For list-based KPIs, return a JSON array of strings. For score-based KPIs, return a float.
Respond with ONLY a single minified JSON object.
---
DATA:
```json
{user_briefs_json}
```
"#;

pub const PITCH_PROMPT_TEMPLATE: &str = r#"
You are a master salesperson on Instagram. Your tone is super-human, casual, and brief.
**Your Goal:** Generate interest in a product.
**Product:** {product_name} ({product_description})
**Link:** {product_link}
**Rules:**
1. **DETECT LANGUAGE:** Analyze the user's conversation history and write your pitch in that SAME language.
2. **BE CONVERSATIONAL:** Your output MUST be a JSON array of 2-4 short strings. Each string is a separate message bubble.
3. **INCLUDE THE LINK:** Weave the `product_link` naturally into one of the messages.
**Target and their recent conversation history:**
```json
{target_brief_json}
```
**Required Output Format (JSON only):**
A single JSON object where the key is the username and the value is an array of strings.
Example: `{"@{username}": ["Hey! 👋", "Check this out, thought you'd love it:", "{product_link}"]}`
"#;

/// Substitute `{key}` placeholders
///
/// Values are inserted in order and are not re-scanned for placeholders
/// introduced by earlier values.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        for (key, value) in values {
            let token_len = key.len() + 2;
            if tail.len() >= token_len
                && tail[1..].starts_with(key)
                && tail[1 + key.len()..].starts_with('}')
            {
                out.push_str(value);
                rest = &tail[token_len..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}
