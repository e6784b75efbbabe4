//! health tool implementation.

use rmcp::model::{CallToolResult, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Output structure for health tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthOutput {
    pub status: String,
    pub uptime_secs: u64,
    /// "open" or "closed".
    pub circuit_breaker: String,
    /// Consecutive upstream failures in the current run.
    pub upstream_failures: u32,
    pub target_state: Option<String>,
    pub records: u64,
}

/// Implementation of the health tool.
pub async fn health_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let breaker = state.breaker.status().await;
    let records = match state.db.record_count().await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "record count unavailable");
            0
        }
    };

    super::json_result(&HealthOutput {
        status: "ok".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        circuit_breaker: breaker.as_str().to_string(),
        upstream_failures: breaker.failures,
        target_state: state.config.target_state.clone(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[tokio::test]
    async fn test_health_reports_breaker_closed() {
        let state = test_state(mgnrega_core::AppConfig {
            target_state: Some("UTTAR PRADESH".into()),
            ..Default::default()
        })
        .await;

        let result = health_impl(&state).await.unwrap();
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");

        let output: HealthOutput = serde_json::from_str(text).unwrap();
        assert_eq!(output.status, "ok");
        assert_eq!(output.circuit_breaker, "closed");
        assert_eq!(output.target_state.as_deref(), Some("UTTAR PRADESH"));
        assert_eq!(output.records, 0);
    }
}
