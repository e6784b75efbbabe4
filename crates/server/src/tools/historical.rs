//! historical tool implementation.
//!
//! Per-year aggregate series for one district, read through the cache.

use rmcp::model::{CallToolResult, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mgnrega_core::Error;
use mgnrega_core::keys::{HISTORICAL_TTL_SECS, historical_key};
use mgnrega_core::normalize::{HistoryEntry, yearly_entry};

use crate::resolve::Source;
use crate::state::AppState;

/// Input parameters for historical tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistoricalParams {
    /// District name (required).
    pub district: String,

    /// State name; defaults to the configured target state.
    #[serde(default)]
    pub state: Option<String>,
}

/// Output structure for historical tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoricalOutput {
    pub source: Source,
    pub state: String,
    pub district: String,
    /// Yearly entries, oldest first, at most ten.
    pub history: Vec<HistoryEntry>,
}

/// Implementation of the historical tool.
pub async fn historical_impl(state: &AppState, params: HistoricalParams) -> Result<CallToolResult, McpError> {
    if params.district.trim().is_empty() {
        return Err(Error::InvalidInput("district cannot be empty".into()).into());
    }

    let state_name = state.effective_state(params.state.as_deref())?;
    let district = params.district.trim().to_uppercase();
    let key = historical_key(&state_name, &district);

    if let Some(cached) = state.cache.get_json(&key).await
        && let Ok(history) = serde_json::from_str::<Vec<HistoryEntry>>(&cached)
    {
        return super::json_result(&HistoricalOutput { source: Source::Cache, state: state_name, district, history });
    }

    let aggregates = state.db.yearly_aggregates(&state_name, &district).await?;
    if aggregates.is_empty() {
        return Err(Error::NotFound(format!("no historical data for {district}")).into());
    }

    let history: Vec<HistoryEntry> = aggregates
        .iter()
        .map(|agg| yearly_entry(agg, state.config.derivation_policy))
        .collect();

    if let Ok(json) = serde_json::to_string(&history) {
        state.cache.put_json(&key, &json, HISTORICAL_TTL_SECS).await;
    }

    super::json_result(&HistoricalOutput { source: Source::Database, state: state_name, district, history })
}
