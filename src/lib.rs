//! Gmail MCP Gateway Library
//!
//! A Model Context Protocol (MCP) gateway for Gmail. Each tool invocation
//! exchanges the caller's identity token for a Gmail access token and makes
//! one mediated call against the Gmail API.

pub mod config;
pub mod error;
pub mod gateway;
pub mod mcp;

pub use config::Config;
pub use error::{GatewayError, Result};
