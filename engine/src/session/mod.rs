//! Session-scoped lead analysis cache
//!
//! Holds one record per counterpart between resets. Records are created from
//! briefs and later receive the analyst's KPI scores. The cache is owned by the
//! console and passed by reference into each command; nothing here is global.
//!
//! None of the operations fail. Scores for identities the cache does not hold
//! are dropped, since analyst output is untrusted and best-effort.

pub mod kpi;

pub use kpi::{KpiDefinition, KpiScores, KpiValue, KPI_CATALOG, LEAD_KPI};

use serde::Serialize;
use std::collections::HashMap;

/// Cached data for one conversation counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counterpart {
    /// Platform handle, without `@`
    pub display_name: String,

    /// Recent counterpart messages, most recent first
    pub brief: Vec<String>,

    /// Analyst scores; empty until a merge
    pub kpis: KpiScores,
}

impl Counterpart {
    /// Handle for display, falling back to the identity when unknown
    pub fn display_label(&self, identity: &str) -> String {
        if self.display_name.is_empty() {
            format!("user_{}", identity)
        } else {
            self.display_name.clone()
        }
    }
}

/// Insertion-ordered map from counterpart identity to record
#[derive(Debug, Default, Clone)]
pub struct SessionCache {
    records: Vec<(String, Counterpart)>,
    index: HashMap<String, usize>,
}

impl SessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record
    pub fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Insert a record with empty scores
    ///
    /// Returns false and leaves the existing record alone when the identity is
    /// already cached in this session.
    pub fn upsert_brief(
        &mut self,
        identity: impl Into<String>,
        display_name: impl Into<String>,
        brief: Vec<String>,
    ) -> bool {
        let identity = identity.into();
        if self.index.contains_key(&identity) {
            return false;
        }

        self.index.insert(identity.clone(), self.records.len());
        self.records.push((
            identity,
            Counterpart {
                display_name: display_name.into(),
                brief,
                kpis: KpiScores::new(),
            },
        ));
        true
    }

    /// Replace the scores of a cached identity
    ///
    /// Full replace, not a per-KPI merge. Returns false when the identity is
    /// not cached (the scores are discarded).
    pub fn merge_kpis(&mut self, identity: &str, kpis: KpiScores) -> bool {
        match self.index.get(identity) {
            Some(&pos) => {
                self.records[pos].1.kpis = kpis;
                true
            }
            None => {
                tracing::debug!("Dropping scores for unknown identity {}", identity);
                false
            }
        }
    }

    /// Records in insertion order
    ///
    /// Borrowing iterator; call again to start over.
    pub fn all_records(&self) -> impl Iterator<Item = (&str, &Counterpart)> + Clone + '_ {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Look up one record
    pub fn get(&self, identity: &str) -> Option<&Counterpart> {
        self.index.get(identity).map(|&pos| &self.records[pos].1)
    }

    /// True iff no analysis has been run this session
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True iff at least one record carries scores
    pub fn is_scored(&self) -> bool {
        self.records.iter().any(|(_, r)| !r.kpis.is_empty())
    }
}
