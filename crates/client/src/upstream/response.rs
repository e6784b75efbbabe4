//! Upstream response types.

use serde::Deserialize;

/// Envelope returned by the data.gov.in resource API.
///
/// Records are kept as raw JSON objects: the API has shipped at least two
/// field-name vintages for the same resource, so interpretation is deferred
/// to the normalization layer.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub records: Vec<serde_json::Value>,

    /// Total matching records, when the API reports it.
    #[serde(default)]
    pub total: Option<u64>,

    /// Records in this page, when the API reports it.
    #[serde(default)]
    pub count: Option<u64>,
}

impl UpstreamResponse {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope() {
        let body = r#"{
            "total": 1523,
            "count": 2,
            "records": [
                {"state_name": "UTTAR PRADESH", "district_name": "LUCKNOW"},
                {"state_name": "UTTAR PRADESH", "district_name": "KANPUR NAGAR"}
            ]
        }"#;

        let response: UpstreamResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.total, Some(1523));
        assert_eq!(response.records.len(), 2);
        assert_eq!(response.records[0]["district_name"], "LUCKNOW");
    }

    #[test]
    fn test_parse_missing_records() {
        let response: UpstreamResponse = serde_json::from_str("{}").unwrap();
        assert!(response.is_empty());
        assert!(response.total.is_none());
    }
}
