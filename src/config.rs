//! Configuration management for the Gmail MCP Gateway
//!
//! Handles endpoint locations and environment variables.

use std::net::SocketAddr;

use crate::error::{ConfigError, GatewayError, Result};

/// Configuration for the Gmail MCP Gateway
#[derive(Debug, Clone)]
pub struct Config {
    /// Token-issuance endpoint that exchanges identity tokens for access tokens
    pub token_endpoint: String,

    /// Base URL for Gmail API calls on behalf of the authenticated user
    pub mail_api_base: String,

    /// OpenID userinfo endpoint
    pub userinfo_url: String,

    /// Address the HTTP transport listens on
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Create a configuration from the environment, falling back to defaults
    pub fn new() -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match std::env::var("GATEWAY_BIND_ADDR") {
            Ok(raw) => raw.parse::<SocketAddr>().map_err(|e: std::net::AddrParseError| {
                GatewayError::Config(ConfigError::InvalidEnvVar {
                    var: "GATEWAY_BIND_ADDR".to_string(),
                    message: e.to_string(),
                })
            })?,
            Err(_) => defaults.bind_addr,
        };

        Ok(Self {
            token_endpoint: env_or("GATEWAY_TOKEN_ENDPOINT", defaults.token_endpoint),
            mail_api_base: env_or("GATEWAY_MAIL_API_BASE", defaults.mail_api_base),
            userinfo_url: env_or("GATEWAY_USERINFO_URL", defaults.userinfo_url),
            bind_addr,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_endpoint: endpoints::TOKEN_ENDPOINT.to_string(),
            mail_api_base: endpoints::MAIL_API_BASE.to_string(),
            userinfo_url: endpoints::USERINFO_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
        }
    }
}

fn env_or(var: &str, default: String) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or(default)
}

/// Fixed downstream endpoints
pub mod endpoints {
    /// Token-issuance endpoint
    pub const TOKEN_ENDPOINT: &str = "https://curlmate.dev/api/token";

    /// Gmail API, scoped to the authenticated user
    pub const MAIL_API_BASE: &str = "https://www.googleapis.com/gmail/v1/users/me";

    /// OpenID Connect userinfo
    pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
}

/// Invocation metadata keys read from each inbound request
pub mod metadata {
    /// Identity token
    pub const ACCESS_TOKEN: &str = "access-token";

    /// Connection identifier (also the header name sent to the issuance endpoint)
    pub const CONNECTION: &str = "x-connection";
}
