//! Gateway core
//!
//! Token exchange, message encoding, and the downstream Gmail API client.

pub mod client;
pub mod credentials;
pub mod encoder;
pub mod types;
