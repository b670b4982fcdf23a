//! Social-media account adapters
//!
//! The console only needs `sdk::SocialClient`. [`BridgeClient`] implements it
//! against an HTTP gateway that wraps the platform's client library and owns
//! the login session.

pub mod bridge;

pub use bridge::BridgeClient;
