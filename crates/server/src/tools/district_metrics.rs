//! district_metrics tool implementation.
//!
//! Point lookup through the freshness tier chain.

use rmcp::model::{CallToolResult, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mgnrega_core::{Error, FrontendMetrics};

use crate::resolve::Source;
use crate::state::AppState;

/// Fiscal year used when the caller leaves it out.
const DEFAULT_FIN_YEAR: &str = "2024-2025";

/// Input parameters for district_metrics tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DistrictMetricsParams {
    /// District name (required), e.g. "LUCKNOW".
    pub district: String,

    /// State name; defaults to the configured target state.
    #[serde(default)]
    pub state: Option<String>,

    /// Fiscal year, e.g. "2024-2025" (the default).
    #[serde(default)]
    pub fin_year: Option<String>,
}

/// Output structure for district_metrics tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DistrictMetricsOutput {
    /// Which tier served the data.
    pub source: Source,
    pub data: FrontendMetrics,
}

/// Implementation of the district_metrics tool.
pub async fn district_metrics_impl(
    state: &AppState, params: DistrictMetricsParams,
) -> Result<CallToolResult, McpError> {
    if params.district.trim().is_empty() {
        return Err(Error::InvalidInput("district cannot be empty".into()).into());
    }

    let state_name = state.effective_state(params.state.as_deref())?;
    let district = params.district.trim().to_uppercase();
    let fin_year = params.fin_year.as_deref().unwrap_or(DEFAULT_FIN_YEAR);

    let resolution = state.resolver.resolve(&state_name, &district, fin_year).await?;

    super::json_result(&DistrictMetricsOutput { source: resolution.source, data: resolution.data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use mgnrega_core::store::MetricRecord;

    #[tokio::test]
    async fn test_empty_district_rejected() {
        let state = test_state(Default::default()).await;
        let params = DistrictMetricsParams { district: "  ".into(), ..Default::default() };

        let result = district_metrics_impl(&state, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_state_rejected_without_target() {
        let state = test_state(Default::default()).await;
        let params = DistrictMetricsParams { district: "LUCKNOW".into(), ..Default::default() };

        let result = district_metrics_impl(&state, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_lookup_from_store() {
        let state = test_state(mgnrega_core::AppConfig {
            target_state: Some("UTTAR PRADESH".into()),
            ..Default::default()
        })
        .await;

        state
            .db
            .upsert_record(&MetricRecord {
                fin_year: "2024-2025".into(),
                month: "12".into(),
                state_name: "UTTAR PRADESH".into(),
                district_name: "LUCKNOW".into(),
                data_payload: r#"{"Total_Individuals_Worked":"40000","Women_Persondays":"12000"}"#.into(),
                updated_at: chrono::Utc::now().to_rfc3339(),
                ..Default::default()
            })
            .await
            .unwrap();

        // Lowercase input and omitted fin_year resolve to the same record.
        let params = DistrictMetricsParams { district: "lucknow".into(), ..Default::default() };
        let result = district_metrics_impl(&state, params).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));
    }

    #[tokio::test]
    async fn test_unknown_district_not_found() {
        let state = test_state(mgnrega_core::AppConfig {
            target_state: Some("UTTAR PRADESH".into()),
            ..Default::default()
        })
        .await;

        let params = DistrictMetricsParams { district: "NOWHERE".into(), ..Default::default() };
        let result = district_metrics_impl(&state, params).await;
        assert!(result.is_err());
    }
}
