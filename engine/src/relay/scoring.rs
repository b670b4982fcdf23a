//! AI Scoring Relay

use sdk::collaborator::Analyst;
use sdk::errors::EngineError;
use serde::Serialize;

use super::prompts::{fill, ANALYSIS_PROMPT_TEMPLATE};
use super::{json_kind, parse_reply};
use crate::session::kpi::kpi_names;
use crate::session::{KpiScores, KpiValue, SessionCache};

/// Validated analyst scores, keyed by identity
pub type ScoreSet = Vec<(String, KpiScores)>;

#[derive(Serialize)]
struct BriefEntry<'a> {
    user_id: &'a str,
    brief: &'a [String],
}

/// Build the scoring prompt for every cached brief
pub fn analysis_prompt(cache: &SessionCache) -> String {
    let entries: Vec<BriefEntry<'_>> = cache
        .all_records()
        .map(|(user_id, record)| BriefEntry {
            user_id,
            brief: &record.brief,
        })
        .collect();

    let kpi_list = format!(
        "[{}]",
        kpi_names()
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let briefs_json = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());

    fill(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("kpi_list", kpi_list.as_str()),
            ("user_briefs_json", briefs_json.as_str()),
        ],
    )
}

/// Ask the analyst to score the cached briefs
///
/// The reply is fully validated before returning; nothing is merged here.
pub async fn request_scores(
    analyst: &dyn Analyst,
    cache: &SessionCache,
) -> Result<ScoreSet, EngineError> {
    let prompt = analysis_prompt(cache);
    tracing::info!(
        "Requesting scores for {} counterpart(s) from {}",
        cache.len(),
        analyst.name()
    );

    let reply = analyst.analyze(&prompt).await?;
    tracing::debug!("Analyst reply: {} chars", reply.len());

    parse_scores(&reply)
}

/// Parse a raw analyst reply into scores
pub fn parse_scores(reply: &str) -> Result<ScoreSet, EngineError> {
    scores_from_value(parse_reply(reply)?)
}

/// Validate an `{identity: {kpi: value}}` object
pub fn scores_from_value(value: serde_json::Value) -> Result<ScoreSet, EngineError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(EngineError::MalformedAiResponse(format!(
            "expected an object of identity -> KPI map, got {}",
            json_kind(&value)
        )));
    };

    let mut scores = Vec::with_capacity(entries.len());
    for (identity, kpis) in entries {
        let serde_json::Value::Object(kpis) = kpis else {
            return Err(EngineError::MalformedAiResponse(format!(
                "KPIs for '{}' must be an object, got {}",
                identity,
                json_kind(&kpis)
            )));
        };

        let mut map = KpiScores::new();
        for (name, raw) in kpis {
            let value: KpiValue = serde_json::from_value(raw)
                .map_err(|e| EngineError::MalformedAiResponse(e.to_string()))?;
            map.insert(name, value);
        }
        scores.push((identity, map));
    }

    Ok(scores)
}

/// Merge validated scores into the cache
///
/// Returns how many cached identities received scores. Unknown identities are
/// dropped.
pub fn merge(cache: &mut SessionCache, scores: ScoreSet) -> usize {
    let total = scores.len();
    let mut merged = 0;
    for (identity, kpis) in scores {
        if cache.merge_kpis(&identity, kpis) {
            merged += 1;
        }
    }

    if merged < total {
        tracing::warn!(
            "Ignored scores for {} identity(ies) not in this session",
            total - merged
        );
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedAnalyst(&'static str);

    #[async_trait]
    impl Analyst for CannedAnalyst {
        fn name(&self) -> &str {
            "canned"
        }

        async fn analyze(&self, _prompt: &str) -> Result<String, EngineError> {
            Ok(self.0.to_string())
        }
    }

    fn cache() -> SessionCache {
        let mut cache = SessionCache::new();
        cache.upsert_brief("u1", "ana", vec!["how much?".to_string()]);
        cache.upsert_brief("u2", "ben", vec!["[clip]".to_string()]);
        cache
    }

    #[test]
    fn test_prompt_embeds_kpis_and_briefs() {
        let prompt = analysis_prompt(&cache());
        assert!(prompt.contains(r#"["spending", "price_focus", "trust", "sentiment", "curiosity", "language", "personality", "common_words"]"#));
        assert!(prompt.contains(r#""user_id": "u1""#));
        assert!(prompt.contains("how much?"));
        assert!(prompt.contains("Respond with ONLY a single minified JSON object."));
        assert!(!prompt.contains("{user_briefs_json}"));
    }

    #[test]
    fn test_parse_scores_shapes() {
        let scores =
            parse_scores(r#"{"u1": {"spending": 0.8, "personality": ["warm"]}, "u2": {}}"#)
                .unwrap();
        assert_eq!(scores.len(), 2);
        let (id, kpis) = &scores[0];
        assert_eq!(id, "u1");
        assert_eq!(kpis.get("spending"), Some(&KpiValue::from(0.8)));
        assert_eq!(kpis.get("personality"), Some(&KpiValue::from(vec!["warm"])));
    }

    #[test]
    fn test_wrong_shapes_are_malformed() {
        for reply in [r#"["u1"]"#, r#"{"u1": 0.8}"#, r#"{"u1": ["a"]}"#, "not json"] {
            assert!(
                matches!(parse_scores(reply), Err(EngineError::MalformedAiResponse(_))),
                "reply should be rejected: {}",
                reply
            );
        }
    }

    #[test]
    fn test_merge_drops_unknown_identities() {
        let mut cache = cache();
        let scores = scores_from_value(json!({
            "u1": {"spending": 0.8},
            "ghost": {"spending": 1.0}
        }))
        .unwrap();

        assert_eq!(merge(&mut cache, scores), 1);
        assert!(cache.get("ghost").is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get("u1").unwrap().kpis.get("spending"),
            Some(&KpiValue::from(0.8))
        );
    }

    #[test]
    fn test_merge_counts_only_cached_identities() {
        let mut cache = cache();
        let scores = scores_from_value(json!({
            "ghost": {"spending": 1.0},
            "u2": {"trust": 0.4},
            "u1": {"spending": 0.2}
        }))
        .unwrap();

        assert_eq!(merge(&mut cache, scores), 2);
        assert!(cache.is_scored());
        assert_eq!(
            cache.get("u2").unwrap().kpis.get("trust"),
            Some(&KpiValue::from(0.4))
        );
        assert_eq!(merge(&mut cache, Vec::new()), 0);
    }

    #[tokio::test]
    async fn test_request_scores_uses_analyst() {
        let analyst = CannedAnalyst("```json\n{\"u2\": {\"trust\": 0.4}}\n```");
        let scores = request_scores(&analyst, &cache()).await.unwrap();
        assert_eq!(scores[0].0, "u2");
    }

    #[tokio::test]
    async fn test_request_scores_rejects_prose() {
        let analyst = CannedAnalyst("I could not score these users.");
        let result = request_scores(&analyst, &cache()).await;
        assert!(matches!(result, Err(EngineError::MalformedAiResponse(_))));
    }
}
