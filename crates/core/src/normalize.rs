//! Field normalization from raw records to the frontend contract.
//!
//! Upstream records arrive in two shapes: the data.gov.in API uses verbose
//! field names (`Total_No_of_Active_Job_Cards`), while persisted rows use
//! snake-case aggregate names (`active_job_cards`). Both feed the same
//! `FrontendMetrics` output through [`normalize`].
//!
//! Every numeric field is coerced with parse-or-zero semantics: absent,
//! malformed, or non-finite inputs become 0 and never propagate NaN or null
//! downstream. Monetary and percentage outputs are formatted to fixed
//! precision as strings at this boundary; internal math is full f64.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::records::MetricRecord;
use crate::store::series::YearlyAggregate;

/// How derived metrics are computed from seemingly analogous inputs.
///
/// The upstream dataset changed vintage mid-life and the two conventions
/// are not reconcilable automatically, so the choice is configuration:
///
/// - `Direct` (current vintage): `Total_Individuals_Worked` is authoritative
///   for person-days and `Total_Exp` is already in rupees.
/// - `Computed` (older vintage): person-days must be derived as
///   `active job cards x average days per household`, and wage/material
///   fields are reported in lakhs, so expenditure is
///   `(wages + material_and_skilled_wages) x 100000`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivationPolicy {
    #[default]
    Direct,
    Computed,
}

/// The normalized, UI-ready record shape.
///
/// Invariant: every numeric field is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FrontendMetrics {
    pub fin_year: String,
    pub state_name: String,
    pub district_name: String,
    pub job_cards_issued: f64,
    pub active_job_cards: f64,
    pub person_days_generated: i64,
    /// Formatted to 2 decimal places.
    pub avg_days_per_household: String,
    /// Formatted to 1 decimal place.
    pub women_participation_percent: String,
    pub women_person_days: i64,
    pub completed_works: f64,
    pub ongoing_works: f64,
    /// Rupees, rounded to the nearest whole.
    pub total_expenditure: i64,
    /// Formatted to 2 decimal places.
    pub avg_wage_rate: String,
    pub total_households_worked: f64,
    pub active_workers: f64,
}

/// One entry of the historical yearly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HistoryEntry {
    pub year: String,
    pub person_days_generated: i64,
    /// Formatted to 1 decimal place.
    pub avg_days_per_household: String,
    pub active_job_cards: f64,
    pub active_workers: f64,
    /// Formatted to 1 decimal place.
    pub women_participation_percent: String,
    pub women_person_days: i64,
    pub total_expenditure: i64,
    pub avg_wage_rate: f64,
    pub completed_works: f64,
    pub ongoing_works: f64,
}

/// Coerce the first usable numeric field among `names` to a non-negative f64.
///
/// A field that is present but zero yields to later names, matching the
/// original dashboard's fallback across the two record vintages. Strings are
/// parsed; anything malformed or non-finite counts as absent.
fn metric(payload: &Value, names: &[&str]) -> f64 {
    for name in names {
        let parsed = match payload.get(name) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(v) = parsed
            && v.is_finite()
            && v > 0.0
        {
            return v;
        }
    }
    0.0
}

/// First non-empty string field among `names`.
fn label(payload: &Value, names: &[&str]) -> String {
    for name in names {
        if let Some(Value::String(s)) = payload.get(name)
            && !s.is_empty()
        {
            return s.clone();
        }
    }
    String::new()
}

/// Normalize a raw record (API-shaped or row-shaped) into `FrontendMetrics`.
pub fn normalize(payload: &Value, policy: DerivationPolicy) -> FrontendMetrics {
    let active_cards = metric(payload, &["Total_No_of_Active_Job_Cards", "active_job_cards"]);
    let avg_days_reported = metric(
        payload,
        &["Average_days_of_employment_provided_per_Household", "avg_days_employment", "avg_days_per_household"],
    );
    let women_days = metric(payload, &["Women_Persondays", "women_persondays", "women_person_days"]);
    let avg_wage = metric(payload, &["Average_Wage_rate_per_day_per_person", "avg_wage_rate"]);

    let person_days = match policy {
        DerivationPolicy::Direct => {
            metric(payload, &["Total_Individuals_Worked", "total_individuals_worked", "person_days_generated"])
        }
        DerivationPolicy::Computed => active_cards * avg_days_reported,
    };

    let avg_days = if avg_days_reported > 0.0 {
        avg_days_reported
    } else {
        person_days / active_cards.max(1.0)
    };

    let women_percent = if person_days > 0.0 { women_days / person_days * 100.0 } else { 0.0 };

    let total_expenditure = match policy {
        DerivationPolicy::Direct => metric(payload, &["Total_Exp", "total_expenditure"]),
        DerivationPolicy::Computed => {
            let wages_lakhs = metric(payload, &["Wages", "wages"]);
            let materials_lakhs = metric(payload, &["Material_and_skilled_Wages", "material_and_skilled_wages"]);
            (wages_lakhs + materials_lakhs) * 100_000.0
        }
    };

    FrontendMetrics {
        fin_year: label(payload, &["fin_year"]),
        state_name: label(payload, &["state_name"]),
        district_name: label(payload, &["district_name"]),
        job_cards_issued: metric(payload, &["Total_No_of_JobCards_issued", "job_cards_issued"]),
        active_job_cards: active_cards,
        person_days_generated: person_days.round() as i64,
        avg_days_per_household: format!("{avg_days:.2}"),
        women_participation_percent: format!("{women_percent:.1}"),
        women_person_days: women_days.round() as i64,
        completed_works: metric(payload, &["Number_of_Completed_Works", "completed_works"]),
        ongoing_works: metric(payload, &["Number_of_Ongoing_Works", "ongoing_works"]),
        total_expenditure: total_expenditure.round() as i64,
        avg_wage_rate: format!("{avg_wage:.2}"),
        total_households_worked: metric(payload, &["Total_Households_Worked", "total_households_worked"]),
        active_workers: metric(payload, &["Total_No_of_Active_Workers", "active_workers"]),
    }
}

/// Map a raw upstream record into the storage schema.
///
/// Applies the same parse-or-zero coercion as [`normalize`]; the unmodified
/// payload is kept alongside the derived columns so records can be
/// reprocessed if the mapping ever changes.
pub fn record_from_payload(payload: &Value) -> MetricRecord {
    MetricRecord {
        fin_year: label(payload, &["fin_year"]),
        month: label(payload, &["month"]),
        state_code: label(payload, &["state_code"]),
        state_name: label(payload, &["state_name"]),
        district_code: label(payload, &["district_code"]),
        district_name: label(payload, &["district_name"]),
        approved_labour_budget: metric(payload, &["Approved_Labour_Budget"]),
        avg_wage_rate: metric(payload, &["Average_Wage_rate_per_day_per_person"]),
        avg_days_employment: metric(payload, &["Average_days_of_employment_provided_per_Household"]),
        diff_abled_persons_worked: metric(payload, &["Differently_abled_persons_worked"]),
        material_and_skilled_wages: metric(payload, &["Material_and_skilled_Wages"]),
        completed_works: metric(payload, &["Number_of_Completed_Works"]),
        gps_with_nil_exp: metric(payload, &["Number_of_GPs_with_NIL_exp"]),
        ongoing_works: metric(payload, &["Number_of_Ongoing_Works"]),
        central_liability_persondays: metric(payload, &["Persondays_of_Central_Liability_so_far"]),
        sc_persondays: metric(payload, &["SC_persondays"]),
        sc_workers_active: metric(payload, &["SC_workers_against_active_workers"]),
        st_persondays: metric(payload, &["ST_persondays"]),
        st_workers_active: metric(payload, &["ST_workers_against_active_workers"]),
        total_admin_expenditure: metric(payload, &["Total_Adm_Expenditure"]),
        total_expenditure: metric(payload, &["Total_Exp"]),
        total_households_worked: metric(payload, &["Total_Households_Worked"]),
        total_individuals_worked: metric(payload, &["Total_Individuals_Worked"]),
        active_job_cards: metric(payload, &["Total_No_of_Active_Job_Cards"]),
        active_workers: metric(payload, &["Total_No_of_Active_Workers"]),
        hh_completed_100_days: metric(payload, &["Total_No_of_HHs_completed_100_Days_of_Wage_Employment"]),
        job_cards_issued: metric(payload, &["Total_No_of_JobCards_issued"]),
        total_workers: metric(payload, &["Total_No_of_Workers"]),
        works_takenup: metric(payload, &["Total_No_of_Works_Takenup"]),
        wages: metric(payload, &["Wages"]),
        women_persondays: metric(payload, &["Women_Persondays"]),
        percent_category_b_works: metric(payload, &["percent_of_Category_B_Works"]),
        percent_agri_allied_works: metric(payload, &["percent_of_Expenditure_on_Agriculture_Allied_Works"]),
        percent_nrm_expenditure: metric(payload, &["percent_of_NRM_Expenditure"]),
        percent_payments_15_days: metric(payload, &["percentage_payments_gererated_within_15_days"]),
        remarks: label(payload, &["Remarks"]),
        data_payload: payload.to_string(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Derive one historical series entry from a per-year aggregate row.
pub fn yearly_entry(agg: &YearlyAggregate, policy: DerivationPolicy) -> HistoryEntry {
    let person_days = match policy {
        DerivationPolicy::Direct => agg.individuals_worked,
        DerivationPolicy::Computed => agg.active_job_cards * agg.avg_days_employment,
    };

    let avg_days = if agg.avg_days_employment > 0.0 {
        agg.avg_days_employment
    } else {
        person_days / agg.active_job_cards.max(1.0)
    };

    let women_percent = if person_days > 0.0 { agg.women_persondays / person_days * 100.0 } else { 0.0 };

    let total_expenditure = match policy {
        DerivationPolicy::Direct => agg.total_expenditure,
        DerivationPolicy::Computed => (agg.wages_lakhs + agg.materials_lakhs) * 100_000.0,
    };

    HistoryEntry {
        year: agg.fin_year.clone(),
        person_days_generated: person_days.round() as i64,
        avg_days_per_household: format!("{avg_days:.1}"),
        active_job_cards: agg.active_job_cards,
        active_workers: agg.active_workers,
        women_participation_percent: format!("{women_percent:.1}"),
        women_person_days: agg.women_persondays.round() as i64,
        total_expenditure: total_expenditure.round() as i64,
        avg_wage_rate: agg.avg_wage_rate,
        completed_works: agg.completed_works,
        ongoing_works: agg.ongoing_works,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_payload() -> Value {
        json!({
            "fin_year": "2024-2025",
            "state_name": "UTTAR PRADESH",
            "district_name": "LUCKNOW",
            "Total_No_of_JobCards_issued": "2500",
            "Total_No_of_Active_Job_Cards": "1000",
            "Total_Individuals_Worked": "40000",
            "Average_days_of_employment_provided_per_Household": "40",
            "Women_Persondays": "12000",
            "Average_Wage_rate_per_day_per_person": "230.5",
            "Number_of_Completed_Works": "120",
            "Number_of_Ongoing_Works": "80",
            "Total_Exp": "560000",
            "Wages": "3.5",
            "Material_and_skilled_Wages": "2.1",
            "Total_Households_Worked": "950",
            "Total_No_of_Active_Workers": "1800"
        })
    }

    #[test]
    fn test_direct_policy_api_shape() {
        let m = normalize(&api_payload(), DerivationPolicy::Direct);
        assert_eq!(m.fin_year, "2024-2025");
        assert_eq!(m.district_name, "LUCKNOW");
        assert_eq!(m.person_days_generated, 40_000);
        assert_eq!(m.avg_days_per_household, "40.00");
        assert_eq!(m.women_participation_percent, "30.0");
        assert_eq!(m.total_expenditure, 560_000);
        assert_eq!(m.avg_wage_rate, "230.50");
    }

    #[test]
    fn test_computed_policy_api_shape() {
        let m = normalize(&api_payload(), DerivationPolicy::Computed);
        // 1000 active cards x 40 days
        assert_eq!(m.person_days_generated, 40_000);
        assert_eq!(m.women_participation_percent, "30.0");
        // (3.5 + 2.1) lakhs
        assert_eq!(m.total_expenditure, 560_000);
    }

    #[test]
    fn test_row_shape_fallback_names() {
        let row = json!({
            "fin_year": "2023-2024",
            "state_name": "UTTAR PRADESH",
            "district_name": "VARANASI",
            "active_job_cards": 800.0,
            "avg_days_employment": 35.0,
            "women_persondays": 5600.0,
            "avg_wage_rate": 210.0,
            "total_individuals_worked": 28000.0,
            "total_expenditure": 420000.0
        });

        let m = normalize(&row, DerivationPolicy::Direct);
        assert_eq!(m.person_days_generated, 28_000);
        assert_eq!(m.active_job_cards, 800.0);
        assert_eq!(m.women_participation_percent, "20.0");
        assert_eq!(m.total_expenditure, 420_000);
    }

    #[test]
    fn test_missing_inputs_default_to_zero() {
        let m = normalize(&json!({}), DerivationPolicy::Direct);
        assert_eq!(m.person_days_generated, 0);
        assert_eq!(m.active_job_cards, 0.0);
        assert_eq!(m.women_participation_percent, "0.0");
        assert_eq!(m.avg_days_per_household, "0.00");
        assert_eq!(m.total_expenditure, 0);
    }

    #[test]
    fn test_zero_person_days_no_division() {
        let payload = json!({
            "Total_Individuals_Worked": "0",
            "Women_Persondays": "500"
        });
        let m = normalize(&payload, DerivationPolicy::Direct);
        assert_eq!(m.women_participation_percent, "0.0");
    }

    #[test]
    fn test_malformed_numbers_are_zero() {
        let payload = json!({
            "Total_Individuals_Worked": "n/a",
            "Total_No_of_Active_Job_Cards": "NaN",
            "Average_Wage_rate_per_day_per_person": {"nested": true}
        });
        let m = normalize(&payload, DerivationPolicy::Direct);
        assert_eq!(m.person_days_generated, 0);
        assert_eq!(m.active_job_cards, 0.0);
        assert_eq!(m.avg_wage_rate, "0.00");
    }

    #[test]
    fn test_avg_days_derived_when_unreported() {
        let payload = json!({
            "Total_Individuals_Worked": "9000",
            "Total_No_of_Active_Job_Cards": "300"
        });
        let m = normalize(&payload, DerivationPolicy::Direct);
        assert_eq!(m.avg_days_per_household, "30.00");
    }

    #[test]
    fn test_record_from_payload() {
        let record = record_from_payload(&api_payload());
        assert_eq!(record.state_name, "UTTAR PRADESH");
        assert_eq!(record.district_name, "LUCKNOW");
        assert_eq!(record.active_job_cards, 1000.0);
        assert_eq!(record.total_individuals_worked, 40_000.0);
        assert_eq!(record.avg_wage_rate, 230.5);
        // The raw payload round-trips through the stored JSON text.
        let stored: Value = serde_json::from_str(&record.data_payload).unwrap();
        assert_eq!(stored, api_payload());
        assert!(record.is_fresh(1));
    }

    #[test]
    fn test_record_from_payload_defaults() {
        let record = record_from_payload(&json!({"state_name": "BIHAR"}));
        assert_eq!(record.state_name, "BIHAR");
        assert_eq!(record.fin_year, "");
        assert_eq!(record.wages, 0.0);
        assert_eq!(record.remarks, "");
    }

    #[test]
    fn test_yearly_entry_computed() {
        let agg = YearlyAggregate {
            fin_year: "2022-2023".into(),
            active_job_cards: 1000.0,
            avg_days_employment: 40.0,
            active_workers: 1500.0,
            women_persondays: 12000.0,
            wages_lakhs: 3.0,
            materials_lakhs: 1.0,
            avg_wage_rate: 215.0,
            completed_works: 50.0,
            ongoing_works: 20.0,
            individuals_worked: 0.0,
            total_expenditure: 0.0,
        };

        let entry = yearly_entry(&agg, DerivationPolicy::Computed);
        assert_eq!(entry.person_days_generated, 40_000);
        assert_eq!(entry.women_participation_percent, "30.0");
        assert_eq!(entry.total_expenditure, 400_000);
        assert_eq!(entry.avg_days_per_household, "40.0");
    }
}
