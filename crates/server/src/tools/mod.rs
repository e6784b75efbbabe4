//! MCP tool implementations.
//!
//! Each tool is a thin parameter-validation and serialization layer over
//! the resolver, store, sync engine, and geocode client held in
//! [`crate::state::AppState`].
#![allow(unused_imports)]

pub mod detect_district;
pub mod district_metrics;
pub mod districts;
pub mod health;
pub mod historical;
pub mod sync_now;

pub use detect_district::{DetectDistrictOutput, DetectDistrictParams};
pub use district_metrics::{DistrictMetricsOutput, DistrictMetricsParams};
pub use districts::{DistrictsOutput, DistrictsParams};
pub use health::HealthOutput;
pub use historical::{HistoricalOutput, HistoricalParams};
pub use sync_now::SyncNowOutput;

use rmcp::model::{CallToolResult, Content, ErrorData as McpError};
use serde::Serialize;

/// Render a tool output struct as a pretty-printed JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(output).unwrap_or_default(),
    )]))
}
