// crates/file-search/src/cli/serve.rs
// MCP server initialization and main loop

use super::Context;
use anyhow::Result;
use file_search::mcp::{AllowList, FileSearchServer};
use tracing::{info, warn};

/// Serve the allowed tools over stdio. Starts without an API key too;
/// tools then report the missing key when called.
pub async fn run_mcp_server(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;
    settings.validate().log();

    let allow = AllowList::parse(&settings.mcp_tools);
    if allow.tools.is_empty() {
        warn!(list = %settings.mcp_tools, "Tool allow-list selects no tools");
    }
    let server = FileSearchServer::new(ctx.optional_gateway(), &allow);
    info!(tools = server.tool_names().len(), "Starting MCP server on stdio");

    // Run with stdio transport
    let transport = rmcp::transport::io::stdio();
    let service = rmcp::serve_server(server, transport).await?;
    service.waiting().await?;

    Ok(())
}
