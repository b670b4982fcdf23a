//! Brief Builder
//!
//! Reduces raw one-on-one threads to a short list of the counterpart's most
//! recent messages, which is what the analyst sees.

use sdk::thread::{RawMessage, RawThread};
use serde::Serialize;
use std::cmp::Reverse;

/// Default number of messages kept per brief
pub const DEFAULT_MAX_MESSAGES: usize = 20;

/// Default characters kept per message
pub const DEFAULT_MAX_CHARS: usize = 200;

/// Placeholder type for non-text items of unknown kind
const UNKNOWN_ITEM_TYPE: &str = "media";

/// Brief limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BriefLimits {
    pub max_messages: usize,
    pub max_chars: usize,
}

impl Default for BriefLimits {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// A counterpart and their recent messages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brief {
    pub identity: String,
    pub display_name: String,
    pub messages: Vec<String>,
}

/// Build the brief for one thread
///
/// Returns `None` for group threads, threads without exactly one counterpart,
/// and counterparts who never sent a text message.
pub fn build(
    thread: &RawThread,
    self_identity: &str,
    max_messages: usize,
    max_chars: usize,
) -> Option<Brief> {
    if thread.is_group || thread.participants.len() > 2 {
        tracing::debug!("Skipping group thread {}", thread.id);
        return None;
    }

    let mut others = thread
        .participants
        .iter()
        .filter(|p| p.id != self_identity);
    let counterpart = others.next()?;
    if others.next().is_some() {
        return None;
    }

    let mut authored: Vec<&RawMessage> = thread
        .messages
        .iter()
        .filter(|m| m.author_id.as_deref() == Some(counterpart.id.as_str()))
        .collect();

    if !authored.iter().any(|m| has_text(m)) {
        tracing::debug!(
            "Skipping thread {}: @{} sent no text",
            thread.id,
            counterpart.username
        );
        return None;
    }

    // Newest first; untimed messages keep platform order after timed ones
    authored.sort_by_key(|m| Reverse(m.timestamp));

    let messages = authored
        .into_iter()
        .take(max_messages)
        .map(|m| brief_line(m, max_chars))
        .collect();

    Some(Brief {
        identity: counterpart.id.clone(),
        display_name: counterpart.username.clone(),
        messages,
    })
}

/// Build briefs for a fetch batch, in thread order
pub fn build_all(threads: &[RawThread], self_identity: &str, limits: BriefLimits) -> Vec<Brief> {
    threads
        .iter()
        .filter_map(|t| build(t, self_identity, limits.max_messages, limits.max_chars))
        .collect()
}

fn has_text(message: &RawMessage) -> bool {
    message.text.as_deref().is_some_and(|t| !t.is_empty())
}

fn brief_line(message: &RawMessage, max_chars: usize) -> String {
    match message.text.as_deref() {
        Some(text) if !text.is_empty() => text.chars().take(max_chars).collect(),
        _ => format!(
            "[{}]",
            message.item_type.as_deref().unwrap_or(UNKNOWN_ITEM_TYPE)
        ),
    }
}
