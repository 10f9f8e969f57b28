//! Credential resolution
//!
//! Exchanges the inbound identity token and connection identifier for a
//! downstream Gmail access token. Every invocation performs its own exchange:
//! nothing is cached and nothing is retried.

use std::fmt;

use crate::config::metadata;
use crate::error::{CredentialError, GatewayError, Result};
use crate::gateway::types::AccessTokenResponse;

/// Downstream bearer credential, owned by a single invocation
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token value
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as sent in the `Authorization` header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges identity tokens against the token-issuance endpoint
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    /// HTTP client
    http_client: reqwest::Client,

    /// Token-issuance endpoint
    endpoint: String,
}

impl CredentialResolver {
    /// Create a resolver for the given issuance endpoint
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    /// Resolve an access token
    ///
    /// Fails with `MissingCredentialInput` before any network call when either
    /// input is absent or empty.
    pub async fn resolve(
        &self,
        identity_token: Option<&str>,
        connection_id: Option<&str>,
    ) -> Result<AccessToken> {
        let identity_token = present(identity_token, metadata::ACCESS_TOKEN)?;
        let connection_id = present(connection_id, metadata::CONNECTION)?;

        tracing::debug!("Exchanging identity token at {}", self.endpoint);

        let response = self
            .http_client
            .get(&self.endpoint)
            .bearer_auth(identity_token)
            .header(metadata::CONNECTION, connection_id)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Credential(
                CredentialError::TokenExchangeFailed {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        let parsed: AccessTokenResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::Credential(CredentialError::MalformedTokenResponse {
                message: e.to_string(),
            })
        })?;

        Ok(AccessToken::new(parsed.access_token))
    }
}

fn present<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GatewayError::Credential(
            CredentialError::MissingCredentialInput { field },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(server: &MockServer) -> CredentialResolver {
        CredentialResolver::new(reqwest::Client::new(), format!("{}/api/token", server.uri()))
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-value");
        assert!(!format!("{:?}", token).contains("secret-value"));
        assert_eq!(token.as_str(), "secret-value");
    }

    #[tokio::test]
    async fn test_missing_inputs_fail_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let resolver = resolver(&server);

        let err = resolver.resolve(None, Some("conn")).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Credential(CredentialError::MissingCredentialInput {
                field: "access-token"
            })
        ));

        let err = resolver.resolve(Some("jwt"), None).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Credential(CredentialError::MissingCredentialInput {
                field: "x-connection"
            })
        ));

        let err = resolver.resolve(Some(""), Some("conn")).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Credential(CredentialError::MissingCredentialInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_successful_exchange_sends_both_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/token"))
            .and(header("authorization", "Bearer jwt-123"))
            .and(header("x-connection", "gmail-work"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"accessToken": "ya29.abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = resolver(&server)
            .resolve(Some("jwt-123"), Some("gmail-work"))
            .await
            .unwrap();
        assert_eq!(token.as_str(), "ya29.abc");
    }

    #[tokio::test]
    async fn test_rejected_exchange_carries_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .resolve(Some("jwt"), Some("conn"))
            .await
            .unwrap_err();
        match err {
            GatewayError::Credential(CredentialError::TokenExchangeFailed { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid token");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "x"})))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .resolve(Some("jwt"), Some("conn"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Credential(CredentialError::MalformedTokenResponse { .. })
        ));
    }
}
