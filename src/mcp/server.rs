//! MCP Server implementation
//!
//! Routes JSON-RPC messages to the tool handler. Transport-agnostic: the
//! stdio loop lives here, the HTTP surface in `mcp::http`. Both hand every
//! message the invocation metadata of the request that carried it.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::mcp::tools::{InvocationContext, InvocationMetadata, ToolHandler};
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "gmail-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the Gmail gateway
pub struct McpServer {
    /// Tool handler
    tool_handler: ToolHandler,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self { tool_handler }
    }

    /// Run the server on stdio, using one set of credentials for the whole session
    pub async fn run_stdio(&self, metadata: InvocationMetadata) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line, &metadata).await {
                let mut response_str = serde_json::to_string(&response)?;
                response_str.push('\n');
                stdout.write_all(response_str.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle an incoming JSON-RPC message
    ///
    /// Returns `None` for notifications.
    pub async fn handle_message(
        &self,
        message: &str,
        metadata: &InvocationMetadata,
    ) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::unidentified_error(
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        self.handle_request(request, metadata).await
    }

    /// Handle a parsed JSON-RPC request
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        metadata: &InvocationMetadata,
    ) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!("Received notification {}", request.method);
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported JSON-RPC version: {}",
                    request.jsonrpc
                )),
            ));
        }

        let outcome = match request.method.as_str() {
            methods::INITIALIZE => Ok(self.handle_initialize()),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => Ok(self.handle_list_tools()),
            methods::CALL_TOOL => self.handle_call_tool(&request, metadata).await,
            methods::INITIALIZED => return None,
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Value {
        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        serde_json::to_value(result).unwrap_or(Value::Null)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Value {
        let result = ListToolsResult {
            tools: self.tool_handler.list_tools(),
        };

        serde_json::to_value(result).unwrap_or(Value::Null)
    }

    /// Handle call tool request
    async fn handle_call_tool(
        &self,
        request: &JsonRpcRequest,
        metadata: &InvocationMetadata,
    ) -> std::result::Result<Value, JsonRpcError> {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => serde_json::from_value(p.clone()).map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e))
            })?,
            None => return Err(JsonRpcError::invalid_params("Missing tool parameters")),
        };

        let ctx = InvocationContext::new(metadata.clone(), params.arguments);

        match self.tool_handler.call_tool(&params.name, ctx).await {
            Ok(result) => serde_json::to_value(result)
                .map_err(|e| JsonRpcError::internal_error(e.to_string())),
            Err(e) if e.is_protocol_rejection() => Err(JsonRpcError::invalid_params(e.to_string())),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", params.name, e);
                Err(JsonRpcError::internal_error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;

    fn server() -> McpServer {
        McpServer::new(ToolHandler::from_config(&Config::default()))
    }

    #[test]
    fn test_server_info() {
        assert_eq!(SERVER_NAME, "gmail-mcp");
    }

    #[tokio::test]
    async fn test_initialize_reports_tools_capability() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
                &InvocationMetadata::default(),
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "gmail-mcp");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
                &InvocationMetadata::default(),
            )
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = server()
            .handle_message("{not json", &InvocationMetadata::default())
            .await
            .unwrap();
        assert!(response.id.is_none());
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#,
                &InvocationMetadata::default(),
            )
            .await
            .unwrap();
        assert_eq!(response.id, Some(RequestId::String("a".to_string())));
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_call_tool_without_params() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call"}"#,
                &InvocationMetadata::default(),
            )
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_missing_credentials_fault_the_call() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"authenticated-user","arguments":{}}}"#,
                &InvocationMetadata::default(),
            )
            .await
            .unwrap();
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, -32603);
        assert!(error.message.contains("access-token"));
    }
}
