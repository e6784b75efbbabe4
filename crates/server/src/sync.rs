//! Batch loader that mirrors upstream records into the store.
//!
//! Each configured fiscal year is paginated independently so one year's
//! upstream failure cannot abort the rest of the run. Record-level upsert
//! failures are logged and skipped. Re-running over the same data is
//! harmless because ingestion is an idempotent upsert.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mgnrega_client::{RecordQuery, UpstreamClient};
use mgnrega_core::MetricsDb;
use mgnrega_core::normalize::record_from_payload;

/// Records requested per upstream page.
const PAGE_SIZE: u32 = 1000;

/// Outcome of one full sync pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub records_saved: u64,
    pub years_failed: u32,
}

/// Periodic and on-demand ingestion driver.
pub struct SyncEngine {
    db: MetricsDb,
    upstream: Option<Arc<UpstreamClient>>,
    target_state: Option<String>,
    years: Vec<String>,
    running: AtomicBool,
}

impl SyncEngine {
    pub fn new(
        db: MetricsDb, upstream: Option<Arc<UpstreamClient>>, target_state: Option<String>, years: Vec<String>,
    ) -> Self {
        Self { db, upstream, target_state, years, running: AtomicBool::new(false) }
    }

    /// Run one full sync pass over all configured fiscal years.
    ///
    /// Overlapping invocations (scheduled plus manual) would only waste
    /// upstream quota, so a single-flight guard turns the second caller
    /// into a no-op.
    pub async fn run_once(&self) -> SyncReport {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::info!("sync already in flight, skipping");
            return SyncReport::default();
        }

        let report = self.run_years().await;
        self.running.store(false, Ordering::SeqCst);
        report
    }

    async fn run_years(&self) -> SyncReport {
        let Some(upstream) = self.upstream.clone() else {
            tracing::warn!("sync skipped, no upstream API key configured");
            return SyncReport::default();
        };

        let mut report = SyncReport::default();
        for year in &self.years {
            match self.sync_year(&upstream, year).await {
                Ok(saved) => {
                    tracing::info!(year, saved, "fiscal year synced");
                    report.records_saved += saved;
                }
                Err(e) => {
                    tracing::error!(year, error = %e, "fiscal year sync failed");
                    report.years_failed += 1;
                }
            }
        }

        tracing::info!(saved = report.records_saved, failed_years = report.years_failed, "sync pass complete");
        report
    }

    /// Paginate one fiscal year until a short or empty page.
    async fn sync_year(&self, upstream: &UpstreamClient, year: &str) -> Result<u64, mgnrega_client::UpstreamError> {
        let mut offset = 0u32;
        let mut saved = 0u64;

        loop {
            let query = RecordQuery::page(self.target_state.as_deref(), year, PAGE_SIZE, offset);
            let response = upstream.fetch(&query).await?;
            if response.is_empty() {
                break;
            }

            saved += self.ingest_page(year, &response.records).await;

            if response.records.len() < PAGE_SIZE as usize {
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(saved)
    }

    /// Write one page of raw records into the store.
    ///
    /// The upstream query-level state filter is not trusted to be exact,
    /// so the state is re-checked per record. Records without identity
    /// fields are skipped, and a failed upsert does not abort the page.
    async fn ingest_page(&self, year: &str, records: &[serde_json::Value]) -> u64 {
        let mut saved = 0u64;

        for raw in records {
            let record = record_from_payload(raw);

            if let Some(target) = &self.target_state
                && !record.state_name.eq_ignore_ascii_case(target)
            {
                continue;
            }

            if record.state_name.is_empty() || record.district_name.is_empty() {
                tracing::warn!(year, "skipping record without identity fields");
                continue;
            }

            match self.db.upsert_record(&record).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    tracing::error!(
                        district = %record.district_name,
                        error = %e,
                        "record upsert failed, continuing"
                    );
                }
            }
        }

        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{JsonStub, upstream_client};
    use serde_json::json;

    #[tokio::test]
    async fn test_run_without_upstream_is_noop() {
        let db = MetricsDb::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(db.clone(), None, None, vec!["2024-2025".into()]);

        let report = engine.run_once().await;
        assert_eq!(report, SyncReport::default());
        assert_eq!(db.record_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_single_flight_guard() {
        let db = MetricsDb::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(db, None, None, vec![]);

        // Simulate an in-flight run; the next caller bails out immediately.
        engine.running.store(true, Ordering::SeqCst);
        let report = engine.run_once().await;
        assert_eq!(report, SyncReport::default());
    }

    #[tokio::test]
    async fn test_ingest_page_filters_and_saves() {
        let db = MetricsDb::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(db.clone(), None, Some("UTTAR PRADESH".into()), vec![]);

        let records = vec![
            json!({"state_name": "BIHAR", "district_name": "PATNA", "fin_year": "2024-2025", "month": "12"}),
            json!({"state_name": "UTTAR PRADESH", "fin_year": "2024-2025", "month": "12"}),
            json!({"state_name": "UTTAR PRADESH", "district_name": "LUCKNOW", "fin_year": "2024-2025", "month": "12"}),
        ];
        let saved = engine.ingest_page("2024-2025", &records).await;
        assert_eq!(saved, 1);
        assert_eq!(db.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_failure_does_not_abort_page() {
        let db = MetricsDb::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(db.clone(), None, None, vec![]);
        db.close().await.unwrap();

        let records = vec![
            json!({"state_name": "UTTAR PRADESH", "district_name": "LUCKNOW", "fin_year": "2024-2025", "month": "12"}),
            json!({"state_name": "UTTAR PRADESH", "district_name": "VARANASI", "fin_year": "2024-2025", "month": "12"}),
        ];
        let saved = engine.ingest_page("2024-2025", &records).await;
        assert_eq!(saved, 0);
    }

    #[tokio::test]
    async fn test_short_page_ends_pagination() {
        let body = json!({
            "records": [
                {"state_name": "UTTAR PRADESH", "district_name": "LUCKNOW", "fin_year": "2024-2025", "month": "12"}
            ],
            "total": 1,
            "count": 1
        })
        .to_string();
        let stub = JsonStub::serve(body).await;

        let db = MetricsDb::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(db.clone(), Some(upstream_client(&stub.base_url)), None, vec![
            "2024-2025".into(),
        ]);

        let report = engine.run_once().await;
        assert_eq!(report.records_saved, 1);
        assert_eq!(report.years_failed, 0);
        assert_eq!(stub.hits(), 1);
        assert_eq!(db.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_counts_failed_years() {
        let db = MetricsDb::open_in_memory().await.unwrap();
        let engine = SyncEngine::new(db.clone(), Some(upstream_client("http://127.0.0.1:9")), None, vec![
            "2023-2024".into(),
            "2024-2025".into(),
        ]);

        let report = engine.run_once().await;
        assert_eq!(report.years_failed, 2);
        assert_eq!(report.records_saved, 0);
        assert_eq!(db.record_count().await.unwrap(), 0);
    }
}
