//! District list and historical aggregate queries.
//!
//! Backs the `districts` and `historical` operations with read-only
//! queries over the persisted metric records.

use super::connection::MetricsDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// SUM/MAX/AVG rollup of one fiscal year for one district.
///
/// Carries the inputs for both derivation policies; the normalizer picks
/// which columns are authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub fin_year: String,
    pub active_job_cards: f64,
    pub avg_days_employment: f64,
    pub active_workers: f64,
    pub women_persondays: f64,
    pub wages_lakhs: f64,
    pub materials_lakhs: f64,
    pub avg_wage_rate: f64,
    pub completed_works: f64,
    pub ongoing_works: f64,
    pub individuals_worked: f64,
    pub total_expenditure: f64,
}

impl MetricsDb {
    /// Ordered distinct district names for one state.
    pub async fn district_names(&self, state: &str) -> Result<Vec<String>, Error> {
        let state = state.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT district_name FROM metric_records
                    WHERE state_name = ?1
                    ORDER BY district_name",
                )?;

                let rows = stmt.query_map(params![state], |row| row.get::<_, String>(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Per-year aggregates for one district, oldest first.
    ///
    /// Takes the 10 most recent fiscal years and returns them ascending.
    pub async fn yearly_aggregates(&self, state: &str, district: &str) -> Result<Vec<YearlyAggregate>, Error> {
        let state = state.to_string();
        let district = district.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<YearlyAggregate>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT
                        fin_year,
                        MAX(active_job_cards),
                        MAX(avg_days_employment),
                        MAX(active_workers),
                        SUM(women_persondays),
                        SUM(wages),
                        SUM(material_and_skilled_wages),
                        AVG(avg_wage_rate),
                        MAX(completed_works),
                        MAX(ongoing_works),
                        SUM(total_individuals_worked),
                        SUM(total_expenditure)
                    FROM metric_records
                    WHERE state_name = ?1 AND district_name = ?2
                    GROUP BY fin_year
                    ORDER BY fin_year DESC
                    LIMIT 10",
                )?;

                let rows = stmt.query_map(params![state, district], |row| {
                    Ok(YearlyAggregate {
                        fin_year: row.get(0)?,
                        active_job_cards: row.get(1)?,
                        avg_days_employment: row.get(2)?,
                        active_workers: row.get(3)?,
                        women_persondays: row.get(4)?,
                        wages_lakhs: row.get(5)?,
                        materials_lakhs: row.get(6)?,
                        avg_wage_rate: row.get(7)?,
                        completed_works: row.get(8)?,
                        ongoing_works: row.get(9)?,
                        individuals_worked: row.get(10)?,
                        total_expenditure: row.get(11)?,
                    })
                })?;

                let mut aggregates = Vec::new();
                for row in rows {
                    aggregates.push(row?);
                }
                // Query is newest-first to apply the limit; consumers want ascending.
                aggregates.reverse();
                Ok(aggregates)
            })
            .await
            .map_err(Error::from)
    }
}
