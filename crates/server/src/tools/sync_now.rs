//! sync_now tool implementation.
//!
//! Fire-and-forget trigger for a full sync pass.

use rmcp::model::{CallToolResult, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Output structure for sync_now tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncNowOutput {
    pub status: String,
}

/// Implementation of the sync_now tool.
///
/// The pass runs in the background; the single-flight guard inside the
/// engine turns a trigger during a running pass into a no-op.
pub async fn sync_now_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let engine = state.sync.clone();
    tokio::spawn(async move {
        engine.run_once().await;
    });

    super::json_result(&SyncNowOutput { status: "sync started".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[tokio::test]
    async fn test_ack_is_immediate() {
        let state = test_state(Default::default()).await;
        let result = sync_now_impl(&state).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));
    }
}
