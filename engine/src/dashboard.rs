//! Table Renderer
//!
//! Fixed-width text grid of the session cache. Hosts parse this layout, so it
//! is kept byte-for-byte stable:
//!
//! ```text
//! | User                 | Spending         |  Trust           |
//! |----------------------|-----------------|-----------------|
//! | @ana                | 0.80            | N/A             |
//! ```
//!
//! Header columns are joined with `" | "` while rows close every cell with
//! `" |"`, so header and body are intentionally not aligned column for column.

use crate::ranker::Lead;
use crate::session::{Counterpart, KpiValue, SessionCache};

const USER_WIDTH: usize = 20;
const HANDLE_WIDTH: usize = USER_WIDTH - 2;
const CELL_WIDTH: usize = 15;
const MISSING: &str = "N/A";

/// Render every cached record, one row each, in insertion order
pub fn render(cache: &SessionCache, kpi_names: &[&str]) -> String {
    render_rows(cache.all_records(), kpi_names)
}

/// Render a ranked subset, in rank order
pub fn render_leads(leads: &[Lead<'_>], kpi_names: &[&str]) -> String {
    render_rows(leads.iter().map(|l| (l.identity, l.record)), kpi_names)
}

fn render_rows<'a>(
    records: impl Iterator<Item = (&'a str, &'a Counterpart)>,
    kpi_names: &[&str],
) -> String {
    let mut rows = vec![header(kpi_names), separator(kpi_names.len())];

    for (identity, record) in records {
        let mut row = format!(
            "| @{:<width$} |",
            record.display_label(identity),
            width = HANDLE_WIDTH
        );
        for kpi in kpi_names {
            let cell = format_cell(record.kpis.get(*kpi));
            row.push_str(&format!(" {:<width$} |", cell, width = CELL_WIDTH));
        }
        rows.push(row);
    }

    rows.join("\n")
}

fn header(kpi_names: &[&str]) -> String {
    let columns: Vec<String> = kpi_names
        .iter()
        .map(|kpi| format!(" {:<width$} ", title_case(kpi), width = CELL_WIDTH))
        .collect();
    format!(
        "| {:<width$} |{}|",
        "User",
        columns.join(" | "),
        width = USER_WIDTH
    )
}

fn separator(columns: usize) -> String {
    format!(
        "|-{}-|{}",
        "-".repeat(USER_WIDTH),
        format!("{}|", "-".repeat(CELL_WIDTH + 2)).repeat(columns)
    )
}

/// Cell text for one score
///
/// Lists are comma-joined and cut to 15 characters, numbers get two
/// decimals, anything else is stringified and cut to 15 characters.
pub fn format_cell(value: Option<&KpiValue>) -> String {
    match value {
        None => MISSING.to_string(),
        Some(KpiValue::List(items)) => truncate(&items.join(", ")),
        Some(KpiValue::Number(n)) => format!("{:.2}", n),
        Some(KpiValue::Text(s)) => truncate(s),
        Some(KpiValue::Other(v)) => truncate(&v.to_string()),
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(CELL_WIDTH).collect()
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
