//! Insta Buyer SDK
//!
//! Shared traits and types for the lead console and the host processes that
//! drive it. A host implements [`SocialClient`] and [`Analyst`]; the engine
//! supplies everything else.

/// Collaborator traits
pub mod collaborator;

/// Error types and handling
pub mod errors;

/// Raw conversation data
pub mod thread;

/// Command request/result types
pub mod types;

// Re-export commonly used types
pub use collaborator::{Analyst, SocialClient};
pub use errors::{ConsoleErrorExt, EngineError};
pub use thread::{RawMessage, RawParticipant, RawThread};
pub use types::{CommandRequest, CommandResult, ParamError};
