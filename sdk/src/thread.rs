//! Raw conversation data as delivered by the social-media collaborator
//!
//! Field names follow the platform client library (`pk`, `user_id`,
//! `item_type`) so gateway payloads deserialize without an extra mapping
//! layer. Ids are accepted as JSON strings or numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One direct-message thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawThread {
    #[serde(deserialize_with = "id_from_str_or_number")]
    pub id: String,

    #[serde(default)]
    pub is_group: bool,

    /// Thread members (the platform may or may not list the account itself)
    #[serde(default, rename = "users")]
    pub participants: Vec<RawParticipant>,

    /// Messages as returned by the platform, newest first
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

/// A thread member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParticipant {
    #[serde(rename = "pk", deserialize_with = "id_from_str_or_number")]
    pub id: String,

    #[serde(default)]
    pub username: String,
}

/// A single thread item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Sender id; the platform may omit it
    #[serde(
        rename = "user_id",
        default,
        deserialize_with = "optional_id_from_str_or_number"
    )]
    pub author_id: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    /// Platform item type (`text`, `media_share`, `clip`, ...)
    #[serde(default)]
    pub item_type: Option<String>,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawMessage {
    /// Text message without a timestamp
    pub fn text(author_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author_id: Some(author_id.into()),
            text: Some(text.into()),
            item_type: Some("text".to_string()),
            timestamp: None,
        }
    }

    /// Non-text item of the given type
    pub fn media(author_id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            author_id: Some(author_id.into()),
            text: None,
            item_type: Some(item_type.into()),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl RawParticipant {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn id_from_str_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id_from_str_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
