//! data.gov.in MGNREGA resource client.
//!
//! Every request passes through the shared circuit breaker before any I/O
//! happens; the breaker is owned by the composition root and handed in at
//! construction so the sync loader and the per-request path count failures
//! against the same budget.

mod error;
mod request;
mod response;

use std::sync::Arc;
use std::time::Duration;

pub use error::UpstreamError;
pub use request::RecordQuery;
pub use response::UpstreamResponse;

use crate::breaker::CircuitBreaker;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the upstream client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// data.gov.in API key.
    pub api_key: String,

    /// Full resource URL, including the resource UUID.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User-Agent header value.
    pub user_agent: String,
}

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "mgnrega-mirror/0.1".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client for the MGNREGA resource, gated by a circuit breaker.
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
    breaker: Arc<CircuitBreaker>,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig, breaker: Arc<CircuitBreaker>) -> Result<Self, UpstreamError> {
        if config.api_key.is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config, breaker })
    }

    /// Fetch one page of records matching the query.
    ///
    /// Breaker accounting: a rejected call records nothing, an HTTP or
    /// network failure records one failure, and a parsed response records
    /// a success. 4xx auth and rate-limit responses count as failures too
    /// since retrying them immediately cannot help.
    pub async fn fetch(&self, query: &RecordQuery) -> Result<UpstreamResponse, UpstreamError> {
        query.validate()?;

        if !self.breaker.try_acquire().await {
            tracing::warn!("upstream call rejected, circuit breaker open");
            return Err(UpstreamError::CircuitOpen);
        }

        tracing::debug!(
            limit = query.limit,
            offset = ?query.offset,
            district = ?query.district_name,
            fin_year = ?query.fin_year,
            "fetching upstream records"
        );

        match self.send(query).await {
            Ok(response) => {
                self.breaker.record_success().await;
                Ok(response)
            }
            Err(err) => {
                self.breaker.record_failure().await;
                tracing::warn!(error = %err, "upstream fetch failed");
                Err(err)
            }
        }
    }

    async fn send(&self, query: &RecordQuery) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[("api-key", self.config.api_key.as_str()), ("format", "json")])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200 => {}
            401 | 403 => return Err(UpstreamError::AuthError),
            429 => return Err(UpstreamError::RateLimited),
            code => return Err(UpstreamError::HttpError { status: code }),
        }

        response
            .json::<UpstreamResponse>()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}
