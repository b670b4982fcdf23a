//! Insta Buyer Engine Library
//!
//! Lead console over direct-message conversations: fetch and condense
//! conversations, have an AI analyst score each counterpart, rank the
//! leads, draft pitches and send them.
//! It is used by both the main binary and integration tests.

/// Per-counterpart conversation briefs
pub mod brief;

/// CLI interface module
pub mod cli;

/// Configuration management module
pub mod config;

/// Command dispatch and the stdio transport
pub mod console;

/// Tabular dashboard rendering
pub mod dashboard;

/// Command handlers
pub mod handlers;

/// LLM provider abstraction layer
pub mod llm;

/// Paced outbound message delivery
pub mod outreach;

/// KPI ranking
pub mod ranker;

/// Scoring and pitch relays to the analyst
pub mod relay;

/// Secret management module
pub mod secrets;

/// Session cache of briefs and scores
pub mod session;

/// Social gateway client
pub mod social;

/// Telemetry and Observability
pub mod telemetry;
