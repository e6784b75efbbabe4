//! Upstream request types and validation.

use serde::Serialize;

/// Query parameters for a data.gov.in resource fetch.
///
/// Filters serialize to the bracketed form the API expects
/// (`filters[state_name]=UTTAR PRADESH`). The `api-key` and `format`
/// parameters are supplied by the client, not the query.
#[derive(Debug, Clone, Serialize)]
pub struct RecordQuery {
    /// Maximum records per page (1-10000).
    pub limit: u32,

    /// Pagination offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Exact state-name filter.
    #[serde(rename = "filters[state_name]", skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,

    /// Exact district-name filter.
    #[serde(rename = "filters[district_name]", skip_serializing_if = "Option::is_none")]
    pub district_name: Option<String>,

    /// Exact fiscal-year filter.
    #[serde(rename = "filters[fin_year]", skip_serializing_if = "Option::is_none")]
    pub fin_year: Option<String>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self { limit: 1000, offset: None, state_name: None, district_name: None, fin_year: None }
    }
}

impl RecordQuery {
    /// Point lookup: exactly one record for a district and fiscal year.
    pub fn point(state: Option<&str>, district: &str, fin_year: &str) -> Self {
        Self {
            limit: 1,
            state_name: state.map(str::to_string),
            district_name: Some(district.to_string()),
            fin_year: Some(fin_year.to_string()),
            ..Default::default()
        }
    }

    /// One page of a fiscal-year sweep.
    pub fn page(state: Option<&str>, fin_year: &str, limit: u32, offset: u32) -> Self {
        Self {
            limit,
            offset: Some(offset),
            state_name: state.map(str::to_string),
            fin_year: Some(fin_year.to_string()),
            district_name: None,
        }
    }

    /// Validate the query parameters.
    pub fn validate(&self) -> Result<(), super::UpstreamError> {
        use super::UpstreamError;

        if self.limit == 0 || self.limit > 10_000 {
            return Err(UpstreamError::InvalidQuery(format!("limit out of range: {}", self.limit)));
        }

        if let Some(district) = &self.district_name
            && district.is_empty()
        {
            return Err(UpstreamError::InvalidQuery("district filter cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_query() {
        let query = RecordQuery::point(Some("UTTAR PRADESH"), "LUCKNOW", "2024-2025");
        assert_eq!(query.limit, 1);
        assert_eq!(query.district_name.as_deref(), Some("LUCKNOW"));
        assert!(query.offset.is_none());
    }

    #[test]
    fn test_page_query() {
        let query = RecordQuery::page(None, "2024-2025", 1000, 2000);
        assert_eq!(query.limit, 1000);
        assert_eq!(query.offset, Some(2000));
        assert!(query.state_name.is_none());
    }

    #[test]
    fn test_filter_serialization() {
        let query = RecordQuery::point(Some("UTTAR PRADESH"), "LUCKNOW", "2024-2025");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["filters[state_name]"], "UTTAR PRADESH");
        assert_eq!(value["filters[district_name]"], "LUCKNOW");
        assert_eq!(value["limit"], 1);
        assert!(value.get("offset").is_none());
    }

    #[test]
    fn test_validate_limit() {
        let query = RecordQuery { limit: 0, ..Default::default() };
        assert!(query.validate().is_err());

        let query = RecordQuery { limit: 20_000, ..Default::default() };
        assert!(query.validate().is_err());

        let query = RecordQuery::default();
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_district() {
        let query = RecordQuery { district_name: Some(String::new()), ..Default::default() };
        assert!(query.validate().is_err());
    }
}
