//! Freshness resolution for district metric lookups.
//!
//! A lookup walks an ordered tier chain until one produces data: cache,
//! then store (if fresh), then upstream, then the stale store record kept
//! from the second step. Tiers are strictly sequential; a failing tier
//! falls through to the next, and only exhaustion of all four surfaces
//! as not-found to the caller.

use std::sync::Arc;

use mgnrega_client::{KvCache, RecordQuery, UpstreamClient};
use mgnrega_core::keys::{DISTRICT_TTL_SECS, district_key};
use mgnrega_core::normalize::normalize;
use mgnrega_core::store::MetricRecord;
use mgnrega_core::{DerivationPolicy, Error, FrontendMetrics, MetricsDb};
use serde::{Deserialize, Serialize};

/// Which tier satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Cache,
    Database,
    DatabaseStale,
    Api,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Database => "database",
            Source::DatabaseStale => "database-stale",
            Source::Api => "api",
        }
    }
}

/// A resolved lookup: the normalized metrics plus the tier that served them.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub source: Source,
    pub data: FrontendMetrics,
}

/// Walks the tier chain for point lookups.
pub struct Resolver {
    db: MetricsDb,
    cache: Arc<dyn KvCache>,
    upstream: Option<Arc<UpstreamClient>>,
    policy: DerivationPolicy,
    freshness_hours: i64,
}

impl Resolver {
    pub fn new(
        db: MetricsDb, cache: Arc<dyn KvCache>, upstream: Option<Arc<UpstreamClient>>, policy: DerivationPolicy,
        freshness_hours: i64,
    ) -> Self {
        Self { db, cache, upstream, policy, freshness_hours }
    }

    /// Resolve metrics for one district and fiscal year.
    ///
    /// Cache hits are returned verbatim without re-derivation. Store and
    /// upstream hits are normalized and written back to the cache with the
    /// point-lookup TTL. A stale store record is the last resort and is
    /// never re-cached, so it ages out of circulation on its own.
    pub async fn resolve(&self, state: &str, district: &str, fin_year: &str) -> Result<Resolution, Error> {
        let key = district_key(state, district, fin_year);

        if let Some(cached) = self.cache.get_json(&key).await {
            match serde_json::from_str::<FrontendMetrics>(&cached) {
                Ok(data) => {
                    tracing::debug!(key, "cache hit");
                    return Ok(Resolution { source: Source::Cache, data });
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                }
            }
        }

        // A store read error is treated as no data so the chain keeps going.
        let record = match self.db.latest_for_district(state, district, fin_year).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key, error = %e, "store lookup failed, falling through");
                None
            }
        };

        if let Some(record) = &record
            && record.is_fresh(self.freshness_hours)
        {
            let data = self.normalize_record(record);
            self.write_back(&key, &data).await;
            return Ok(Resolution { source: Source::Database, data });
        }

        if let Some(upstream) = &self.upstream {
            let query = RecordQuery::point(Some(state), district, fin_year);
            match upstream.fetch(&query).await {
                Ok(response) => {
                    if let Some(raw) = response.records.first() {
                        let data = normalize(raw, self.policy);
                        self.write_back(&key, &data).await;
                        return Ok(Resolution { source: Source::Api, data });
                    }
                    tracing::debug!(key, "upstream returned no records");
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "upstream fetch failed, falling through");
                }
            }
        }

        if let Some(record) = &record {
            tracing::warn!(key, "serving stale store record");
            let data = self.normalize_record(record);
            return Ok(Resolution { source: Source::DatabaseStale, data });
        }

        Err(Error::NotFound(format!("no data for {district} {fin_year}")))
    }

    /// Normalize a stored record through its raw payload, falling back to
    /// the row columns when the payload text does not parse.
    fn normalize_record(&self, record: &MetricRecord) -> FrontendMetrics {
        let payload = serde_json::from_str(&record.data_payload)
            .or_else(|_| serde_json::to_value(record))
            .unwrap_or(serde_json::Value::Null);
        normalize(&payload, self.policy)
    }

    async fn write_back(&self, key: &str, data: &FrontendMetrics) {
        if let Ok(json) = serde_json::to_string(data) {
            self.cache.put_json(key, &json, DISTRICT_TTL_SECS).await;
        }
    }
}
