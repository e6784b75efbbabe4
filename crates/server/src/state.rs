//! Shared server state.
//!
//! All components are constructed here, once, and shared by handle. The
//! circuit breaker in particular is a single instance used by both the
//! per-request resolver and the sync loader so failures from either path
//! count against the same budget.

use std::sync::Arc;
use std::time::Instant;

use mgnrega_client::{
    CircuitBreaker, GeocodeClient, GeocodeConfig, KvCache, MemoryCache, RedisCache, UpstreamClient, UpstreamConfig,
};
use mgnrega_core::{AppConfig, Error, MetricsDb};

use crate::resolve::Resolver;
use crate::sync::SyncEngine;

pub struct AppState {
    pub config: AppConfig,
    pub db: MetricsDb,
    pub cache: Arc<dyn KvCache>,
    pub breaker: Arc<CircuitBreaker>,
    pub geocode: GeocodeClient,
    pub resolver: Resolver,
    pub sync: Arc<SyncEngine>,
    pub started_at: Instant,
}

impl AppState {
    /// Build the full component graph from configuration.
    pub async fn build(config: AppConfig) -> Result<Arc<Self>, Error> {
        let db = MetricsDb::open(&config.db_path).await?;

        let cache: Arc<dyn KvCache> = match &config.redis_url {
            Some(url) => match RedisCache::connect(url).await {
                Ok(redis) => Arc::new(redis),
                Err(e) => {
                    tracing::warn!(error = %e, "redis unavailable, using in-process cache");
                    Arc::new(MemoryCache::new())
                }
            },
            None => Arc::new(MemoryCache::new()),
        };

        let breaker = Arc::new(CircuitBreaker::new());

        let upstream = match config.require_api_key() {
            Ok(key) => {
                let upstream_config = UpstreamConfig::new(key, config.base_url.clone())
                    .with_timeout(config.timeout())
                    .with_user_agent(config.user_agent.clone());
                Some(Arc::new(
                    UpstreamClient::new(upstream_config, breaker.clone()).map_err(mgnrega_core::Error::from)?,
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "serving from store and cache only");
                None
            }
        };

        let geocode = GeocodeClient::new(GeocodeConfig::new(config.user_agent.clone()))?;

        let resolver = Resolver::new(
            db.clone(),
            cache.clone(),
            upstream.clone(),
            config.derivation_policy,
            config.freshness_hours,
        );

        let sync = Arc::new(SyncEngine::new(
            db.clone(),
            upstream,
            config.target_state.clone(),
            config.sync_years.clone(),
        ));

        Ok(Arc::new(Self { config, db, cache, breaker, geocode, resolver, sync, started_at: Instant::now() }))
    }

    /// The state a lookup applies: the request's own, or the configured
    /// target state when the request leaves it out.
    pub fn effective_state(&self, requested: Option<&str>) -> Result<String, Error> {
        match requested {
            Some(state) if !state.trim().is_empty() => Ok(state.trim().to_uppercase()),
            _ => self
                .config
                .target_state
                .clone()
                .ok_or_else(|| Error::InvalidInput("state is required".to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_state(config: AppConfig) -> Arc<AppState> {
    let db = MetricsDb::open_in_memory().await.unwrap();
    let cache: Arc<dyn KvCache> = Arc::new(MemoryCache::new());
    let breaker = Arc::new(CircuitBreaker::new());
    let geocode = GeocodeClient::new(GeocodeConfig::new("test/0.1")).unwrap();
    let resolver = Resolver::new(db.clone(), cache.clone(), None, config.derivation_policy, config.freshness_hours);
    let sync = Arc::new(SyncEngine::new(db.clone(), None, config.target_state.clone(), config.sync_years.clone()));

    Arc::new(AppState { config, db, cache, breaker, geocode, resolver, sync, started_at: Instant::now() })
}
