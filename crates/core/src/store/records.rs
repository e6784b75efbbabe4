//! Metric record CRUD operations.
//!
//! Provides the per-record upsert used by the sync loop and the point
//! lookup used by the freshness resolver.

use super::connection::MetricsDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// One persisted metrics observation for a (state, district, fiscal year,
/// month) key.
///
/// Numeric columns are recomputed on every upsert; `data_payload` always
/// holds the most recent unmodified upstream record for that key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub fin_year: String,
    pub month: String,
    pub state_code: String,
    pub state_name: String,
    pub district_code: String,
    pub district_name: String,

    pub approved_labour_budget: f64,
    pub avg_wage_rate: f64,
    pub avg_days_employment: f64,
    pub diff_abled_persons_worked: f64,
    pub material_and_skilled_wages: f64,
    pub completed_works: f64,
    pub gps_with_nil_exp: f64,
    pub ongoing_works: f64,
    pub central_liability_persondays: f64,
    pub sc_persondays: f64,
    pub sc_workers_active: f64,
    pub st_persondays: f64,
    pub st_workers_active: f64,
    pub total_admin_expenditure: f64,
    pub total_expenditure: f64,
    pub total_households_worked: f64,
    pub total_individuals_worked: f64,
    pub active_job_cards: f64,
    pub active_workers: f64,
    pub hh_completed_100_days: f64,
    pub job_cards_issued: f64,
    pub total_workers: f64,
    pub works_takenup: f64,
    pub wages: f64,
    pub women_persondays: f64,
    pub percent_category_b_works: f64,
    pub percent_agri_allied_works: f64,
    pub percent_nrm_expenditure: f64,
    pub percent_payments_15_days: f64,

    pub remarks: String,
    /// Unmodified upstream record as JSON text.
    pub data_payload: String,
    /// RFC 3339 timestamp of the last upsert.
    pub updated_at: String,
}

impl MetricRecord {
    /// Whether this record was updated within the last `hours` hours.
    ///
    /// An unparseable timestamp counts as stale.
    pub fn is_fresh(&self, hours: i64) -> bool {
        let Ok(updated) = chrono::DateTime::parse_from_rfc3339(&self.updated_at) else {
            return false;
        };
        let age = chrono::Utc::now().signed_duration_since(updated.with_timezone(&chrono::Utc));
        age < chrono::Duration::hours(hours)
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MetricRecord> {
    Ok(MetricRecord {
        fin_year: row.get(0)?,
        month: row.get(1)?,
        state_code: row.get(2)?,
        state_name: row.get(3)?,
        district_code: row.get(4)?,
        district_name: row.get(5)?,
        approved_labour_budget: row.get(6)?,
        avg_wage_rate: row.get(7)?,
        avg_days_employment: row.get(8)?,
        diff_abled_persons_worked: row.get(9)?,
        material_and_skilled_wages: row.get(10)?,
        completed_works: row.get(11)?,
        gps_with_nil_exp: row.get(12)?,
        ongoing_works: row.get(13)?,
        central_liability_persondays: row.get(14)?,
        sc_persondays: row.get(15)?,
        sc_workers_active: row.get(16)?,
        st_persondays: row.get(17)?,
        st_workers_active: row.get(18)?,
        total_admin_expenditure: row.get(19)?,
        total_expenditure: row.get(20)?,
        total_households_worked: row.get(21)?,
        total_individuals_worked: row.get(22)?,
        active_job_cards: row.get(23)?,
        active_workers: row.get(24)?,
        hh_completed_100_days: row.get(25)?,
        job_cards_issued: row.get(26)?,
        total_workers: row.get(27)?,
        works_takenup: row.get(28)?,
        wages: row.get(29)?,
        women_persondays: row.get(30)?,
        percent_category_b_works: row.get(31)?,
        percent_agri_allied_works: row.get(32)?,
        percent_nrm_expenditure: row.get(33)?,
        percent_payments_15_days: row.get(34)?,
        remarks: row.get(35)?,
        data_payload: row.get(36)?,
        updated_at: row.get(37)?,
    })
}

const RECORD_COLUMNS: &str = "fin_year, month, state_code, state_name, district_code, district_name,
    approved_labour_budget, avg_wage_rate, avg_days_employment, diff_abled_persons_worked,
    material_and_skilled_wages, completed_works, gps_with_nil_exp, ongoing_works,
    central_liability_persondays, sc_persondays, sc_workers_active, st_persondays,
    st_workers_active, total_admin_expenditure, total_expenditure, total_households_worked,
    total_individuals_worked, active_job_cards, active_workers, hh_completed_100_days,
    job_cards_issued, total_workers, works_takenup, wages, women_persondays,
    percent_category_b_works, percent_agri_allied_works, percent_nrm_expenditure,
    percent_payments_15_days, remarks, data_payload, updated_at";

impl MetricsDb {
    /// Insert or update a metric record.
    ///
    /// Uses UPSERT semantics keyed on (state, district, fiscal year, month):
    /// inserts if the key doesn't exist, updates every metric column and the
    /// raw payload if it does. Last write wins.
    pub async fn upsert_record(&self, record: &MetricRecord) -> Result<(), Error> {
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO metric_records (
                    fin_year, month, state_code, state_name, district_code, district_name,
                    approved_labour_budget, avg_wage_rate, avg_days_employment,
                    diff_abled_persons_worked, material_and_skilled_wages, completed_works,
                    gps_with_nil_exp, ongoing_works, central_liability_persondays,
                    sc_persondays, sc_workers_active, st_persondays, st_workers_active,
                    total_admin_expenditure, total_expenditure, total_households_worked,
                    total_individuals_worked, active_job_cards, active_workers,
                    hh_completed_100_days, job_cards_issued, total_workers, works_takenup,
                    wages, women_persondays, percent_category_b_works,
                    percent_agri_allied_works, percent_nrm_expenditure,
                    percent_payments_15_days, remarks, data_payload, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                          ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                          ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
                          ?31, ?32, ?33, ?34, ?35, ?36, ?37, ?38)
                ON CONFLICT(state_name, district_name, fin_year, month) DO UPDATE SET
                    state_code = excluded.state_code,
                    district_code = excluded.district_code,
                    approved_labour_budget = excluded.approved_labour_budget,
                    avg_wage_rate = excluded.avg_wage_rate,
                    avg_days_employment = excluded.avg_days_employment,
                    diff_abled_persons_worked = excluded.diff_abled_persons_worked,
                    material_and_skilled_wages = excluded.material_and_skilled_wages,
                    completed_works = excluded.completed_works,
                    gps_with_nil_exp = excluded.gps_with_nil_exp,
                    ongoing_works = excluded.ongoing_works,
                    central_liability_persondays = excluded.central_liability_persondays,
                    sc_persondays = excluded.sc_persondays,
                    sc_workers_active = excluded.sc_workers_active,
                    st_persondays = excluded.st_persondays,
                    st_workers_active = excluded.st_workers_active,
                    total_admin_expenditure = excluded.total_admin_expenditure,
                    total_expenditure = excluded.total_expenditure,
                    total_households_worked = excluded.total_households_worked,
                    total_individuals_worked = excluded.total_individuals_worked,
                    active_job_cards = excluded.active_job_cards,
                    active_workers = excluded.active_workers,
                    hh_completed_100_days = excluded.hh_completed_100_days,
                    job_cards_issued = excluded.job_cards_issued,
                    total_workers = excluded.total_workers,
                    works_takenup = excluded.works_takenup,
                    wages = excluded.wages,
                    women_persondays = excluded.women_persondays,
                    percent_category_b_works = excluded.percent_category_b_works,
                    percent_agri_allied_works = excluded.percent_agri_allied_works,
                    percent_nrm_expenditure = excluded.percent_nrm_expenditure,
                    percent_payments_15_days = excluded.percent_payments_15_days,
                    remarks = excluded.remarks,
                    data_payload = excluded.data_payload,
                    updated_at = excluded.updated_at",
                    params![
                        &record.fin_year,
                        &record.month,
                        &record.state_code,
                        &record.state_name,
                        &record.district_code,
                        &record.district_name,
                        record.approved_labour_budget,
                        record.avg_wage_rate,
                        record.avg_days_employment,
                        record.diff_abled_persons_worked,
                        record.material_and_skilled_wages,
                        record.completed_works,
                        record.gps_with_nil_exp,
                        record.ongoing_works,
                        record.central_liability_persondays,
                        record.sc_persondays,
                        record.sc_workers_active,
                        record.st_persondays,
                        record.st_workers_active,
                        record.total_admin_expenditure,
                        record.total_expenditure,
                        record.total_households_worked,
                        record.total_individuals_worked,
                        record.active_job_cards,
                        record.active_workers,
                        record.hh_completed_100_days,
                        record.job_cards_issued,
                        record.total_workers,
                        record.works_takenup,
                        record.wages,
                        record.women_persondays,
                        record.percent_category_b_works,
                        record.percent_agri_allied_works,
                        record.percent_nrm_expenditure,
                        record.percent_payments_15_days,
                        &record.remarks,
                        &record.data_payload,
                        &record.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Most recent record for one district and fiscal year.
    ///
    /// Returns None if no row exists for the key.
    pub async fn latest_for_district(
        &self, state: &str, district: &str, fin_year: &str,
    ) -> Result<Option<MetricRecord>, Error> {
        let state = state.to_string();
        let district = district.to_string();
        let fin_year = fin_year.to_string();
        self.conn
            .call(move |conn| -> Result<Option<MetricRecord>, Error> {
                let sql = format!(
                    "SELECT {RECORD_COLUMNS} FROM metric_records
                    WHERE state_name = ?1 AND district_name = ?2 AND fin_year = ?3
                    ORDER BY updated_at DESC
                    LIMIT 1"
                );
                let mut stmt = conn.prepare(&sql)?;

                let result = stmt.query_row(params![state, district, fin_year], record_from_row);

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Total row count, used by ingestion reporting and tests.
    pub async fn record_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM metric_records", [], |row| row.get(0))
                    .map_err(Error::from)?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
