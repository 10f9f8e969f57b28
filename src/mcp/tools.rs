//! MCP Tool definitions and handlers
//!
//! Every tool follows the same lifecycle: parse its arguments, resolve an
//! access token from the invocation's credentials, make one downstream call,
//! and wrap the downstream answer in a `CallToolResult`.
//!
//! Credential failures are returned as `Err` and fault the invocation.
//! Downstream API failures are returned as `Ok` content.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{GatewayError, McpError, Result};
use crate::gateway::client::{DownstreamResponse, MailClient};
use crate::gateway::credentials::{AccessToken, CredentialResolver};
use crate::gateway::encoder::{ContentKind, MailMessageDraft};
use crate::gateway::types::ModifyMessageRequest;
use crate::mcp::types::{CallToolResult, Tool};

/// Tool names
pub mod names {
    pub const SEARCH_EMAILS: &str = "search-emails";
    pub const GET_EMAIL_FULL_CONTENT: &str = "get-email-full-content";
    pub const AUTHENTICATED_USER: &str = "authenticated-user";
    pub const SEND_EMAIL: &str = "send-email";
    pub const CREATE_DRAFT: &str = "create-draft";
    pub const LIST_THREADS: &str = "list-threads";
    pub const MODIFY_LABELS: &str = "modify-labels";
    pub const COMPOSE_AND_SEND: &str = "compose-and-send";
}

/// Credentials taken from the inbound request's metadata
#[derive(Debug, Clone, Default)]
pub struct InvocationMetadata {
    /// Value of the `access-token` key
    pub identity_token: Option<String>,

    /// Value of the `x-connection` key
    pub connection_id: Option<String>,
}

/// Everything a single tool invocation needs, passed explicitly to each handler
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub metadata: InvocationMetadata,
    pub arguments: Value,
}

impl InvocationContext {
    pub fn new(metadata: InvocationMetadata, arguments: Value) -> Self {
        Self {
            metadata,
            arguments,
        }
    }

    /// Deserialize the arguments into a tool's input type
    fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T> {
        let arguments = match &self.arguments {
            Value::Null => json!({}),
            other => other.clone(),
        };

        serde_json::from_value(arguments).map_err(|e| {
            GatewayError::Mcp(McpError::InvalidArguments {
                message: e.to_string(),
            })
        })
    }
}

// ==================== Tool Inputs ====================

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchEmailsArgs {
    /// Gmail search query, e.g. `from:alice is:unread`
    q: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct MessageIdArgs {
    /// ID of the message
    message_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
struct RawMessageArgs {
    /// RFC 822 message, base64url encoded
    raw: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ListThreadsArgs {
    /// Maximum number of threads to return
    #[serde(default)]
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ModifyLabelsArgs {
    /// ID of the message to modify
    message_id: String,

    /// Label IDs to add
    #[serde(default)]
    add_label_ids: Option<Vec<String>>,

    /// Label IDs to remove
    #[serde(default)]
    remove_label_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ComposeAndSendArgs {
    /// Sender address
    from: String,

    /// Recipient address(es)
    to: String,

    /// Subject line
    subject: String,

    /// Message body
    body: String,

    /// CC address(es)
    #[serde(default)]
    cc: Option<String>,

    /// BCC address(es)
    #[serde(default)]
    bcc: Option<String>,

    /// Send the body as HTML instead of plain text
    #[serde(default)]
    is_html: bool,
}

impl ComposeAndSendArgs {
    /// Reject address values that would break out of their header line
    fn check_header_values(&self) -> Result<()> {
        let fields = [
            ("from", Some(&self.from)),
            ("to", Some(&self.to)),
            ("cc", self.cc.as_ref()),
            ("bcc", self.bcc.as_ref()),
        ];

        for (name, value) in fields {
            if value.is_some_and(|v| v.contains(['\r', '\n'])) {
                return Err(GatewayError::Mcp(McpError::InvalidArguments {
                    message: format!("{} must not contain line breaks", name),
                }));
            }
        }

        Ok(())
    }
}

impl From<ComposeAndSendArgs> for MailMessageDraft {
    fn from(args: ComposeAndSendArgs) -> Self {
        Self {
            from: args.from,
            to: args.to,
            subject: args.subject,
            body: args.body,
            cc: args.cc,
            bcc: args.bcc,
            content_kind: if args.is_html {
                ContentKind::Html
            } else {
                ContentKind::PlainText
            },
        }
    }
}

// ==================== Handler ====================

/// Tool handler
pub struct ToolHandler {
    resolver: CredentialResolver,
    mail_client: MailClient,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(resolver: CredentialResolver, mail_client: MailClient) -> Self {
        Self {
            resolver,
            mail_client,
        }
    }

    /// Create a tool handler wired to the configured endpoints
    pub fn from_config(config: &Config) -> Self {
        let http_client = reqwest::Client::new();
        Self::new(
            CredentialResolver::new(http_client.clone(), config.token_endpoint.clone()),
            MailClient::new(http_client, config),
        )
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            tool_def::<SearchEmailsArgs>(names::SEARCH_EMAILS, "Lists all emails matching a Gmail search query"),
            tool_def::<MessageIdArgs>(names::GET_EMAIL_FULL_CONTENT, "Retrieves the full content of a specific email"),
            tool_def::<NoArgs>(names::AUTHENTICATED_USER, "Returns the profile of the authenticated user"),
            tool_def::<RawMessageArgs>(names::SEND_EMAIL, "Sends a pre-encoded RFC 822 message"),
            tool_def::<RawMessageArgs>(names::CREATE_DRAFT, "Creates a draft from a pre-encoded RFC 822 message"),
            tool_def::<ListThreadsArgs>(names::LIST_THREADS, "Lists email threads"),
            tool_def::<ModifyLabelsArgs>(names::MODIFY_LABELS, "Adds or removes labels on an email"),
            tool_def::<ComposeAndSendArgs>(names::COMPOSE_AND_SEND, "Composes an email from fields and sends it"),
        ]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, ctx: InvocationContext) -> Result<CallToolResult> {
        tracing::info!("Invoking tool {}", name);

        match name {
            names::SEARCH_EMAILS => self.handle_search_emails(ctx).await,
            names::GET_EMAIL_FULL_CONTENT => self.handle_get_email(ctx).await,
            names::AUTHENTICATED_USER => self.handle_authenticated_user(ctx).await,
            names::SEND_EMAIL => self.handle_send_email(ctx).await,
            names::CREATE_DRAFT => self.handle_create_draft(ctx).await,
            names::LIST_THREADS => self.handle_list_threads(ctx).await,
            names::MODIFY_LABELS => self.handle_modify_labels(ctx).await,
            names::COMPOSE_AND_SEND => self.handle_compose_and_send(ctx).await,
            _ => Err(GatewayError::Mcp(McpError::UnknownTool {
                name: name.to_string(),
            })),
        }
    }

    async fn access_token(&self, ctx: &InvocationContext) -> Result<AccessToken> {
        self.resolver
            .resolve(
                ctx.metadata.identity_token.as_deref(),
                ctx.metadata.connection_id.as_deref(),
            )
            .await
    }

    // ==================== Tool Handlers ====================

    async fn handle_search_emails(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: SearchEmailsArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let response = self.mail_client.search_messages(&token, &args.q).await?;
        Ok(envelope(response))
    }

    async fn handle_get_email(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: MessageIdArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let response = self.mail_client.get_message(&token, &args.message_id).await?;
        Ok(envelope(response))
    }

    async fn handle_authenticated_user(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let _: NoArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let response = self.mail_client.user_info(&token).await?;
        Ok(envelope(response))
    }

    async fn handle_send_email(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: RawMessageArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let response = self.mail_client.send_message(&token, args.raw).await?;
        Ok(envelope(response))
    }

    async fn handle_create_draft(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: RawMessageArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let response = self.mail_client.create_draft(&token, args.raw).await?;
        Ok(envelope(response))
    }

    async fn handle_list_threads(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: ListThreadsArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let response = self.mail_client.list_threads(&token, args.max_results).await?;
        Ok(envelope(response))
    }

    async fn handle_modify_labels(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: ModifyLabelsArgs = ctx.parse_arguments()?;
        let token = self.access_token(&ctx).await?;

        let request = ModifyMessageRequest {
            add_label_ids: args.add_label_ids,
            remove_label_ids: args.remove_label_ids,
        };

        let response = self
            .mail_client
            .modify_labels(&token, &args.message_id, &request)
            .await?;
        Ok(envelope(response))
    }

    async fn handle_compose_and_send(&self, ctx: InvocationContext) -> Result<CallToolResult> {
        let args: ComposeAndSendArgs = ctx.parse_arguments()?;
        args.check_header_values()?;
        let token = self.access_token(&ctx).await?;

        let raw = MailMessageDraft::from(args).to_raw();
        let response = self.mail_client.send_message(&token, raw.clone()).await?;

        if !response.is_success() {
            tracing::debug!("Composed message was rejected downstream");
        }

        Ok(CallToolResult::texts([
            json!({ "raw": raw }).to_string(),
            response.to_text(),
        ]))
    }
}

/// Wrap a downstream answer, success or failure, as tool content
fn envelope(response: DownstreamResponse) -> CallToolResult {
    CallToolResult::text(response.to_text())
}

fn tool_def<T: JsonSchema>(name: &str, description: &str) -> Tool {
    let schema = schemars::schema_for!(T);

    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"})),
    }
}
