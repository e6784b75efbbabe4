//! Client code for the MGNREGA metrics mirror.
//!
//! This crate provides the upstream data.gov.in client gated by a circuit
//! breaker, the key-value cache wrapper, and the reverse-geocoding client
//! used by the server.

pub mod breaker;
pub mod cache;
pub mod geocode;
pub mod upstream;

pub use breaker::{BreakerStatus, CircuitBreaker};
pub use cache::{KvCache, MemoryCache, RedisCache};
pub use geocode::{GeoAddress, GeocodeClient, GeocodeConfig, normalize_district};
pub use upstream::{RecordQuery, UpstreamClient, UpstreamConfig, UpstreamError, UpstreamResponse};
