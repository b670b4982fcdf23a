//! KPI catalog and score values
//!
//! The catalog is fixed for the lifetime of the process. Scores are supplied
//! by the analyst and are not validated against the descriptions: a KPI that
//! asks for a float may come back as a string and is displayed as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named scoring dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiDefinition {
    pub name: &'static str,
    pub description: &'static str,
}

/// Every KPI the analyst is asked for, in display order
pub const KPI_CATALOG: &[KpiDefinition] = &[
    KpiDefinition {
        name: "spending",
        description: "Score from 0.0 to 1.0 indicating purchase intent.",
    },
    KpiDefinition {
        name: "price_focus",
        description: "Score from 0.0 to 1.0 indicating focus on price/discounts.",
    },
    KpiDefinition {
        name: "trust",
        description: "Score from 0.0 to 1.0 indicating trust in the brand.",
    },
    KpiDefinition {
        name: "sentiment",
        description: "Score from -1.0 (negative) to 1.0 (positive).",
    },
    KpiDefinition {
        name: "curiosity",
        description: "Score from 0.0 to 1.0 indicating how many questions are asked.",
    },
    KpiDefinition {
        name: "language",
        description: "The primary language of the user's messages (e.g., 'English', 'Spanish').",
    },
    KpiDefinition {
        name: "personality",
        description: "A list of 5 single-word adjectives describing the user's personality.",
    },
    KpiDefinition {
        name: "common_words",
        description: "A list of the 5 most common (non-filler) words the user uses.",
    },
];

/// KPI used to pick the lead for a pitch
pub const LEAD_KPI: &str = "spending";

/// Names of all catalog KPIs, in display order
pub fn kpi_names() -> Vec<&'static str> {
    KPI_CATALOG.iter().map(|k| k.name).collect()
}

/// Whether `name` is a catalog KPI
pub fn is_known_kpi(name: &str) -> bool {
    KPI_CATALOG.iter().any(|k| k.name == name)
}

/// A single AI-supplied score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Number(f64),
    List(Vec<String>),
    Text(String),
    Other(serde_json::Value),
}

impl KpiValue {
    /// Numeric value, if this score is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            KpiValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for KpiValue {
    fn from(n: f64) -> Self {
        KpiValue::Number(n)
    }
}

impl From<&str> for KpiValue {
    fn from(s: &str) -> Self {
        KpiValue::Text(s.to_string())
    }
}

impl From<Vec<&str>> for KpiValue {
    fn from(items: Vec<&str>) -> Self {
        KpiValue::List(items.into_iter().map(String::from).collect())
    }
}

/// Scores for one counterpart, keyed by KPI name
pub type KpiScores = BTreeMap<String, KpiValue>;
