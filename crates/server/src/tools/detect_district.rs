//! detect_district tool implementation.
//!
//! Reverse-geocodes a coordinate pair to a district, cached under
//! 3-decimal-place coordinate keys.

use rmcp::model::{CallToolResult, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mgnrega_core::Error;
use mgnrega_core::keys::{GEO_TTL_SECS, geo_key};

use crate::resolve::Source;
use crate::state::AppState;

/// Input parameters for detect_district tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetectDistrictParams {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Output structure for detect_district tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetectDistrictOutput {
    pub source: Source,
    pub state: Option<String>,
    /// District name in the dataset's convention.
    pub district: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedLocation {
    state: Option<String>,
    district: String,
}

/// Implementation of the detect_district tool.
pub async fn detect_district_impl(
    state: &AppState, params: DetectDistrictParams,
) -> Result<CallToolResult, McpError> {
    if !(-90.0..=90.0).contains(&params.latitude) || !(-180.0..=180.0).contains(&params.longitude) {
        return Err(Error::InvalidInput(format!(
            "coordinates out of range: {}, {}",
            params.latitude, params.longitude
        ))
        .into());
    }

    let key = geo_key(params.latitude, params.longitude);

    if let Some(cached) = state.cache.get_json(&key).await
        && let Ok(location) = serde_json::from_str::<CachedLocation>(&cached)
    {
        return super::json_result(&DetectDistrictOutput {
            source: Source::Cache,
            state: location.state,
            district: location.district,
        });
    }

    let address = state.geocode.reverse(params.latitude, params.longitude).await?;

    let Some(district) = address.district else {
        return Err(Error::NotFound("no district at these coordinates".into()).into());
    };

    if let Some(target) = &state.config.target_state
        && let Some(detected) = &address.state
        && !detected.eq_ignore_ascii_case(target)
    {
        return Err(Error::OutOfRegion { detected: detected.clone() }.into());
    }

    let location = CachedLocation { state: address.state, district };
    if let Ok(json) = serde_json::to_string(&location) {
        state.cache.put_json(&key, &json, GEO_TTL_SECS).await;
    }

    super::json_result(&DetectDistrictOutput {
        source: Source::Api,
        state: location.state,
        district: location.district,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[tokio::test]
    async fn test_out_of_range_rejected_before_io() {
        let state = test_state(Default::default()).await;
        let params = DetectDistrictParams { latitude: 120.0, longitude: 80.9 };

        let result = detect_district_impl(&state, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cached_location_short_circuits() {
        let state = test_state(Default::default()).await;
        let location = CachedLocation { state: Some("Uttar Pradesh".into()), district: "LUCKNOW".into() };
        state
            .cache
            .put_json(&geo_key(26.8467, 80.9462), &serde_json::to_string(&location).unwrap(), 60)
            .await;

        // Coordinates differing only past the third decimal hit the same key.
        let params = DetectDistrictParams { latitude: 26.846_72, longitude: 80.946_19 };
        let result = detect_district_impl(&state, params).await.unwrap();

        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val.get("text").and_then(|v| v.as_str()).unwrap();
        let output: DetectDistrictOutput = serde_json::from_str(text).unwrap();
        assert_eq!(output.district, "LUCKNOW");
        assert_eq!(output.source, Source::Cache);
    }
}
