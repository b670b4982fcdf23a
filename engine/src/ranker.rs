//! Lead Ranker
//!
//! Orders cached counterparts by one numeric KPI.

use sdk::errors::EngineError;
use serde::Serialize;

use crate::session::kpi::{is_known_kpi, kpi_names};
use crate::session::{Counterpart, SessionCache};

/// A ranked counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead<'a> {
    pub identity: &'a str,
    #[serde(skip)]
    pub record: &'a Counterpart,
    pub display_name: &'a str,
    pub score: f64,
}

/// Top `n` records by the numeric value of `kpi_name`
///
/// Records without a numeric score for the KPI are left out. Descending unless
/// `ascending`; equal scores keep cache insertion order either way.
pub fn top_n<'a>(
    cache: &'a SessionCache,
    kpi_name: &str,
    n: usize,
    ascending: bool,
) -> Result<Vec<Lead<'a>>, EngineError> {
    if !is_known_kpi(kpi_name) {
        return Err(EngineError::InvalidKpi {
            kpi: kpi_name.to_string(),
            known: kpi_names().into_iter().map(String::from).collect(),
        });
    }

    let mut leads: Vec<Lead<'a>> = cache
        .all_records()
        .filter_map(|(identity, record)| {
            let score = record.kpis.get(kpi_name)?.as_number()?;
            Some(Lead {
                identity,
                record,
                display_name: record.display_name.as_str(),
                score,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in insertion order
    if ascending {
        leads.sort_by(|a, b| a.score.total_cmp(&b.score));
    } else {
        leads.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
    leads.truncate(n);

    Ok(leads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{KpiScores, KpiValue};

    fn cache_with(scores: &[(&str, Option<KpiValue>)]) -> SessionCache {
        let mut cache = SessionCache::new();
        for (id, value) in scores {
            cache.upsert_brief(*id, format!("name_{}", id), vec!["hi".to_string()]);
            if let Some(value) = value {
                let mut kpis = KpiScores::new();
                kpis.insert("spending".to_string(), value.clone());
                cache.merge_kpis(id, kpis);
            }
        }
        cache
    }

    fn ids(leads: &[Lead<'_>]) -> Vec<String> {
        leads.iter().map(|l| l.identity.to_string()).collect()
    }

    #[test]
    fn test_top_two_descending() {
        let cache = cache_with(&[
            ("a", Some(KpiValue::from(0.9))),
            ("b", Some(KpiValue::from(0.2))),
            ("c", Some(KpiValue::from(0.7))),
        ]);

        let leads = top_n(&cache, "spending", 2, false).unwrap();
        assert_eq!(ids(&leads), vec!["a", "c"]);
        assert_eq!(leads[0].score, 0.9);
        assert_eq!(leads[1].score, 0.7);
    }

    #[test]
    fn test_ascending() {
        let cache = cache_with(&[
            ("a", Some(KpiValue::from(0.9))),
            ("b", Some(KpiValue::from(0.2))),
            ("c", Some(KpiValue::from(0.7))),
        ]);

        let leads = top_n(&cache, "spending", 10, true).unwrap();
        assert_eq!(ids(&leads), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_non_numeric_and_missing_excluded() {
        let cache = cache_with(&[
            ("a", Some(KpiValue::from("high"))),
            ("b", None),
            ("c", Some(KpiValue::from(vec!["0.5"]))),
            ("d", Some(KpiValue::from(0.1))),
        ]);

        let leads = top_n(&cache, "spending", 5, false).unwrap();
        assert_eq!(ids(&leads), vec!["d"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let cache = cache_with(&[
            ("x", Some(KpiValue::from(0.5))),
            ("y", Some(KpiValue::from(0.5))),
            ("z", Some(KpiValue::from(0.5))),
        ]);

        assert_eq!(ids(&top_n(&cache, "spending", 3, false).unwrap()), vec!["x", "y", "z"]);
        assert_eq!(ids(&top_n(&cache, "spending", 3, true).unwrap()), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_zero_returns_nothing() {
        let cache = cache_with(&[("a", Some(KpiValue::from(0.9)))]);
        assert!(top_n(&cache, "spending", 0, false).unwrap().is_empty());
    }

    #[test]
    fn test_known_kpi_without_scores_is_empty() {
        let cache = cache_with(&[("a", Some(KpiValue::from(0.9)))]);
        assert!(top_n(&cache, "trust", 3, false).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_kpi_lists_catalog() {
        let cache = cache_with(&[("a", Some(KpiValue::from(0.9)))]);
        match top_n(&cache, "loyalty", 3, false) {
            Err(EngineError::InvalidKpi { kpi, known }) => {
                assert_eq!(kpi, "loyalty");
                assert_eq!(known.len(), 8);
                assert!(known.contains(&"spending".to_string()));
            }
            other => panic!("expected InvalidKpi, got {:?}", other),
        }
    }
}
