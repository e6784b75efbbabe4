//! Cache key naming conventions and TTL policy.
//!
//! Keys are colon-delimited and namespaced by entity kind so that the
//! key-value cache stays inspectable with plain `KEYS`/`SCAN` queries.

/// TTL for the per-state district list (24 hours).
pub const DISTRICTS_TTL_SECS: u64 = 86_400;

/// TTL for the historical yearly series (1 hour).
pub const HISTORICAL_TTL_SECS: u64 = 3_600;

/// TTL for a single district/fiscal-year lookup (1 hour).
pub const DISTRICT_TTL_SECS: u64 = 3_600;

/// TTL for a reverse-geocode result (24 hours).
pub const GEO_TTL_SECS: u64 = 86_400;

/// Key for the ordered district list of a state.
pub fn districts_key(state: &str) -> String {
    format!("districts:{state}")
}

/// Key for the yearly historical series of a district.
pub fn historical_key(state: &str, district: &str) -> String {
    format!("historical:{state}:{district}")
}

/// Key for a point lookup of one district and fiscal year.
pub fn district_key(state: &str, district: &str, fin_year: &str) -> String {
    format!("district:{state}:{district}:{fin_year}")
}

/// Key for a reverse-geocode lookup.
///
/// Coordinates are reduced to 3 decimal places (~110 m) before keying,
/// trading lookup precision for cache hit rate.
pub fn geo_key(latitude: f64, longitude: f64) -> String {
    format!("geo:{latitude:.3}:{longitude:.3}")
}
