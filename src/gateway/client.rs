//! Gmail API client
//!
//! One method per downstream REST call. A non-success status is not an error
//! here: it comes back as `DownstreamResponse::Failure` so the tool layer can
//! hand it to the caller as content. Only transport failures and unparsable
//! success bodies are returned as `Err`.

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::credentials::AccessToken;
use crate::gateway::types::{CreateDraftRequest, ModifyMessageRequest, SendMessageRequest};

/// Outcome of a single downstream call
#[derive(Debug, Clone, PartialEq)]
pub enum DownstreamResponse {
    /// 2xx with a parsed JSON body
    Success(Value),

    /// Any other status with the raw body text
    Failure { status: u16, body: String },
}

impl DownstreamResponse {
    /// JSON-stringified form returned to the caller
    pub fn to_text(&self) -> String {
        match self {
            DownstreamResponse::Success(value) => value.to_string(),
            DownstreamResponse::Failure { body, .. } => Value::String(body.clone()).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownstreamResponse::Success(_))
    }
}

/// Gmail API client
#[derive(Debug, Clone)]
pub struct MailClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Base URL for the authenticated user's mailbox
    api_base: String,

    /// Userinfo endpoint
    userinfo_url: String,
}

impl MailClient {
    /// Create a new client against the configured endpoints
    pub fn new(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            api_base: config.mail_api_base.clone(),
            userinfo_url: config.userinfo_url.clone(),
        }
    }

    /// Base URL for messages
    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base)
    }

    /// URL for a single message
    fn message_url(&self, message_id: &str) -> String {
        format!("{}/{}", self.messages_url(), urlencoding::encode(message_id))
    }

    // ==================== Message Operations ====================

    /// List messages matching a Gmail search query
    pub async fn search_messages(&self, token: &AccessToken, query: &str) -> Result<DownstreamResponse> {
        let url = format!("{}?q={}", self.messages_url(), urlencoding::encode(query));
        self.get(token, &url).await
    }

    /// Fetch one message in full format
    pub async fn get_message(&self, token: &AccessToken, message_id: &str) -> Result<DownstreamResponse> {
        let url = format!("{}?format=full", self.message_url(message_id));
        self.get(token, &url).await
    }

    /// Send a pre-encoded message
    pub async fn send_message(&self, token: &AccessToken, raw: String) -> Result<DownstreamResponse> {
        let url = format!("{}/send", self.messages_url());
        self.post(token, &url, &SendMessageRequest { raw }).await
    }

    /// Apply a label mutation to one message
    pub async fn modify_labels(
        &self,
        token: &AccessToken,
        message_id: &str,
        request: &ModifyMessageRequest,
    ) -> Result<DownstreamResponse> {
        let url = format!("{}/modify", self.message_url(message_id));
        self.post(token, &url, request).await
    }

    // ==================== Drafts and Threads ====================

    /// Create a draft wrapping a pre-encoded message
    pub async fn create_draft(&self, token: &AccessToken, raw: String) -> Result<DownstreamResponse> {
        let url = format!("{}/drafts", self.api_base);
        let request = CreateDraftRequest {
            message: SendMessageRequest { raw },
        };
        self.post(token, &url, &request).await
    }

    /// List threads, optionally capped
    pub async fn list_threads(&self, token: &AccessToken, max_results: Option<u32>) -> Result<DownstreamResponse> {
        let url = match max_results {
            Some(max) => format!("{}/threads?maxResults={}", self.api_base, max),
            None => format!("{}/threads", self.api_base),
        };
        self.get(token, &url).await
    }

    // ==================== Identity ====================

    /// Fetch the authenticated user's profile
    pub async fn user_info(&self, token: &AccessToken) -> Result<DownstreamResponse> {
        let url = self.userinfo_url.clone();
        self.get(token, &url).await
    }

    // ==================== Transport ====================

    async fn get(&self, token: &AccessToken, url: &str) -> Result<DownstreamResponse> {
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        Self::finish(response).await
    }

    async fn post<T: serde::Serialize>(&self, token: &AccessToken, url: &str, body: &T) -> Result<DownstreamResponse> {
        tracing::debug!("POST {}", url);

        let response = self
            .http_client
            .post(url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await?;

        Self::finish(response).await
    }

    async fn finish(response: reqwest::Response) -> Result<DownstreamResponse> {
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Downstream responded {}", status);

        if status.is_success() {
            Ok(DownstreamResponse::Success(serde_json::from_str(&body)?))
        } else {
            Ok(DownstreamResponse::Failure {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> MailClient {
        let config = Config {
            mail_api_base: format!("{}/gmail/v1/users/me", server.uri()),
            userinfo_url: format!("{}/oauth2/v3/userinfo", server.uri()),
            ..Config::default()
        };
        MailClient::new(reqwest::Client::new(), &config)
    }

    fn token() -> AccessToken {
        AccessToken::new("ya29.test")
    }

    #[test]
    fn test_success_text_is_compact_json() {
        let resp = DownstreamResponse::Success(json!({"messages": []}));
        assert_eq!(resp.to_text(), r#"{"messages":[]}"#);
    }

    #[test]
    fn test_failure_text_is_stringified_body() {
        let resp = DownstreamResponse::Failure {
            status: 500,
            body: "server error".to_string(),
        };
        assert_eq!(resp.to_text(), r#""server error""#);
        assert!(!resp.is_success());
    }

    #[test]
    fn test_success_text_preserves_key_order() {
        let value: Value = serde_json::from_str(r#"{"z":1,"a":2}"#).unwrap();
        assert_eq!(DownstreamResponse::Success(value).to_text(), r#"{"z":1,"a":2}"#);
    }

    #[tokio::test]
    async fn test_get_message_requests_full_format() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gmail/v1/users/me/messages/abc123"))
            .and(query_param("format", "full"))
            .and(header("authorization", "Bearer ya29.test"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client(&server).get_message(&token(), "abc123").await.unwrap();
        assert_eq!(resp, DownstreamResponse::Success(json!({"id": "abc123"})));
    }

    #[tokio::test]
    async fn test_create_draft_wraps_raw() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gmail/v1/users/me/drafts"))
            .and(body_json(json!({"message": {"raw": "UkFX"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d1"})))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client(&server)
            .create_draft(&token(), "UkFX".to_string())
            .await
            .unwrap();
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn test_list_threads_with_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gmail/v1/users/me/threads"))
            .and(query_param("maxResults", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"threads": []})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).list_threads(&token(), Some(5)).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = client(&server).user_info(&token()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let resp = client(&server).get_message(&token(), "missing").await.unwrap();
        assert_eq!(
            resp,
            DownstreamResponse::Failure {
                status: 404,
                body: "Not Found".to_string()
            }
        );
    }
}
