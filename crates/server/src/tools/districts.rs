//! districts tool implementation.
//!
//! Ordered district list for one state, read through the cache.

use rmcp::model::{CallToolResult, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mgnrega_core::keys::{DISTRICTS_TTL_SECS, districts_key};

use crate::resolve::Source;
use crate::state::AppState;

/// Input parameters for districts tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DistrictsParams {
    /// State name; defaults to the configured target state.
    #[serde(default)]
    pub state: Option<String>,
}

/// Output structure for districts tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DistrictsOutput {
    pub source: Source,
    pub state: String,
    pub districts: Vec<String>,
}

/// Implementation of the districts tool.
pub async fn districts_impl(state: &AppState, params: DistrictsParams) -> Result<CallToolResult, McpError> {
    let state_name = state.effective_state(params.state.as_deref())?;
    let key = districts_key(&state_name);

    if let Some(cached) = state.cache.get_json(&key).await
        && let Ok(districts) = serde_json::from_str::<Vec<String>>(&cached)
    {
        return super::json_result(&DistrictsOutput { source: Source::Cache, state: state_name, districts });
    }

    let districts = state.db.district_names(&state_name).await?;

    // An empty list just means the store hasn't been synced yet; caching
    // it would hide the data for a full TTL once sync completes.
    if !districts.is_empty()
        && let Ok(json) = serde_json::to_string(&districts)
    {
        state.cache.put_json(&key, &json, DISTRICTS_TTL_SECS).await;
    }

    super::json_result(&DistrictsOutput { source: Source::Database, state: state_name, districts })
}
