//! Nominatim reverse-geocoding client.
//!
//! Used to turn a browser coordinate pair into a district name. Nominatim
//! requires a descriptive User-Agent and a light request rate; results are
//! cached by the caller under rounded-coordinate keys so repeat lookups for
//! the same neighborhood never reach the service.

use std::time::Duration;

use serde::Deserialize;

use mgnrega_core::Error;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the reverse-geocoding client.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl GeocodeConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: user_agent.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    state: Option<String>,
    county: Option<String>,
    state_district: Option<String>,
    city_district: Option<String>,
}

/// Resolved administrative location for a coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoAddress {
    /// State name as reported by Nominatim.
    pub state: Option<String>,

    /// District name, normalized to the upstream dataset's convention.
    pub district: Option<String>,
}

/// Normalize a Nominatim district label to the dataset's naming convention:
/// trailing "district" suffix stripped, uppercased.
pub fn normalize_district(raw: &str) -> String {
    let trimmed = raw.trim();
    let suffix_start = trimmed.len().checked_sub("district".len());
    let stripped = match suffix_start.and_then(|i| trimmed.get(i..)) {
        Some(tail) if tail.eq_ignore_ascii_case("district") => {
            trimmed[..trimmed.len() - "district".len()].trim_end()
        }
        _ => trimmed,
    };
    stripped.to_uppercase()
}

/// Client for Nominatim's `/reverse` endpoint.
pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(config: GeocodeConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| Error::Geocode(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url })
    }

    /// Reverse-geocode a coordinate pair to a state and district.
    ///
    /// Zoom 10 asks Nominatim for district-level granularity. The district
    /// comes from whichever of `county`, `state_district`, or
    /// `city_district` is present, in that order; Indian districts appear
    /// under different keys depending on the state.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<GeoAddress, Error> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }

        let url = format!("{}/reverse", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Geocode(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Geocode(format!("nominatim returned HTTP {status}")));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocode(format!("invalid nominatim response: {e}")))?;

        let district = body
            .address
            .county
            .or(body.address.state_district)
            .or(body.address.city_district)
            .map(|raw| normalize_district(&raw));

        tracing::debug!(?district, state = ?body.address.state, "reverse geocode resolved");

        Ok(GeoAddress { state: body.address.state, district })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_district_suffix() {
        assert_eq!(normalize_district("Lucknow District"), "LUCKNOW");
        assert_eq!(normalize_district("Lucknow district"), "LUCKNOW");
        assert_eq!(normalize_district("  Kanpur Nagar  "), "KANPUR NAGAR");
    }

    #[test]
    fn test_normalize_keeps_interior_words() {
        // Only a trailing suffix is stripped.
        assert_eq!(normalize_district("District Centre"), "DISTRICT CENTRE");
    }

    #[test]
    fn test_address_fallback_order() {
        let body = r#"{"address": {"state": "Uttar Pradesh", "state_district": "Lucknow"}}"#;
        let parsed: NominatimResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.address.state_district.as_deref(), Some("Lucknow"));
        assert!(parsed.address.county.is_none());
    }

    #[test]
    fn test_empty_address() {
        let parsed: NominatimResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.address.state.is_none());
        assert!(parsed.address.county.is_none());
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_coordinates() {
        let client = GeocodeClient::new(GeocodeConfig::new("test/0.1")).unwrap();
        let result = client.reverse(91.0, 80.9).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
