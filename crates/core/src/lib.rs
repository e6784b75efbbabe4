//! Core types and shared functionality for the MGNREGA metrics mirror.
//!
//! This crate provides:
//! - Persisted metrics store with SQLite backend
//! - Field normalization for the two upstream record vintages
//! - Cache key and TTL policy
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod keys;
pub mod normalize;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use normalize::{DerivationPolicy, FrontendMetrics};
pub use store::{MetricRecord, MetricsDb};
