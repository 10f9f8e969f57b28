//! Gmail MCP Gateway - Rust Implementation
//!
//! A Model Context Protocol (MCP) gateway for Gmail. Tools are served over
//! HTTP by default, or over stdio with session-wide credentials.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use gmail_mcp_gateway::config::Config;
use gmail_mcp_gateway::error::Result;
use gmail_mcp_gateway::mcp::http;
use gmail_mcp_gateway::mcp::server::McpServer;
use gmail_mcp_gateway::mcp::tools::{InvocationMetadata, ToolHandler};

/// Gmail MCP Gateway
#[derive(Parser)]
#[command(name = "gmail-mcp-gateway")]
#[command(author, version, about = "Gmail MCP Gateway - token-exchanging MCP server for Gmail")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over HTTP at /mcp (default)
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Serve MCP over stdio
    Stdio {
        /// Identity token used for every invocation in this session
        #[arg(long, env = "GATEWAY_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Connection identifier used for every invocation in this session
        #[arg(long, env = "GATEWAY_CONNECTION")]
        connection: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::new()?;

    let server = Arc::new(McpServer::new(ToolHandler::from_config(&config)));

    match cli.command {
        Some(Commands::Stdio {
            access_token,
            connection,
        }) => {
            let metadata = InvocationMetadata {
                identity_token: access_token,
                connection_id: connection,
            };
            server.run_stdio(metadata).await?;
        }
        Some(Commands::Serve { bind }) => {
            if let Some(addr) = bind {
                config.bind_addr = addr;
            }
            http::serve(server, config.bind_addr).await?;
        }
        None => {
            http::serve(server, config.bind_addr).await?;
        }
    }

    Ok(())
}
