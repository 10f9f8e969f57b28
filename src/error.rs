//! Error types for the Gmail MCP Gateway
//!
//! This module defines the error hierarchy for all operations in the gateway.
//! Every variant here is an invocation-level fault: downstream Gmail API
//! failures are not errors at this layer, they travel back as tool content.

use thiserror::Error;

/// Main error type for the Gmail MCP Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Token exchange errors
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Message encoding errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Credential resolution errors
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("missing {field} in request metadata")]
    MissingCredentialInput { field: &'static str },

    /// The issuance endpoint answered with a non-success status. `body` is
    /// the raw response text, unmodified.
    #[error("{body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("Malformed token response: {message}")]
    MalformedTokenResponse { message: String },
}

/// Message encoding errors
#[derive(Error, Debug)]
#[allow(dead_code)] // base64 is compiled in; kept for parity with the error taxonomy
pub enum EncodingError {
    #[error("No base64 encoder available")]
    EncodingUnavailable,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidEnvVar { var: String, message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Whether the caller sent something the protocol layer should reject,
    /// as opposed to a failure while servicing a well-formed invocation.
    pub fn is_protocol_rejection(&self) -> bool {
        matches!(self, GatewayError::Mcp(_))
    }
}
