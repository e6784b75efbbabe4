//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::state::AppState;
use crate::tools::{
    DetectDistrictParams, DistrictMetricsParams, DistrictsParams, HistoricalParams, detect_district, district_metrics,
    districts, health, historical, sync_now,
};

/// The main MCP server handler for the MGNREGA mirror.
#[derive(Clone)]
pub struct MgnregaServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MgnregaServer {
    /// Create a new server handler over shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Employment metrics for one district and fiscal year. Served from cache, store, or the live API depending on freshness; the source tag says which."
    )]
    async fn district_metrics(&self, params: Parameters<DistrictMetricsParams>) -> Result<CallToolResult, McpError> {
        district_metrics::district_metrics_impl(&self.state, params.0).await
    }

    #[tool(description = "Ordered list of district names with data for a state.")]
    async fn districts(&self, params: Parameters<DistrictsParams>) -> Result<CallToolResult, McpError> {
        districts::districts_impl(&self.state, params.0).await
    }

    #[tool(description = "Historical yearly metrics for one district, oldest first, at most ten years.")]
    async fn historical(&self, params: Parameters<HistoricalParams>) -> Result<CallToolResult, McpError> {
        historical::historical_impl(&self.state, params.0).await
    }

    #[tool(description = "Trigger a background sync of upstream records into the local store.")]
    async fn sync_now(&self) -> Result<CallToolResult, McpError> {
        sync_now::sync_now_impl(&self.state).await
    }

    #[tool(description = "Resolve a latitude/longitude pair to a district name via reverse geocoding.")]
    async fn detect_district(&self, params: Parameters<DetectDistrictParams>) -> Result<CallToolResult, McpError> {
        detect_district::detect_district_impl(&self.state, params.0).await
    }

    #[tool(description = "Server health: uptime, circuit breaker state, and store size.")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        health::health_impl(&self.state).await
    }
}

impl ServerHandler for MgnregaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mgnrega-mirror".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[tokio::test]
    async fn test_router_lists_all_tools() {
        let server = MgnregaServer::new(test_state(Default::default()).await);
        let tools = server.tool_router.list_all();

        let mut names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["detect_district", "district_metrics", "districts", "health", "historical", "sync_now"]
        );
    }
}
