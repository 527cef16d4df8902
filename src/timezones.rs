//! Timezone-name resolution
//!
//! A static table mapping friendly region keys to IANA timezone identifiers.
//! Resolution accepts either a friendly key or an IANA identifier already
//! present in the table.

use crate::error::NocturneError;

/// Friendly region key to IANA identifier
pub const TIMEZONE_MAP: &[(&str, &str)] = &[
    // North America - United States
    ("us_eastern", "America/New_York"),
    ("us_central", "America/Chicago"),
    ("us_mountain", "America/Denver"),
    ("us_pacific", "America/Los_Angeles"),
    ("us_alaska", "America/Anchorage"),
    ("us_hawaii", "Pacific/Honolulu"),
    ("us_arizona", "America/Phoenix"),
    // North America - Canada
    ("canada_atlantic", "America/Halifax"),
    ("canada_eastern", "America/Toronto"),
    ("canada_central", "America/Winnipeg"),
    ("canada_mountain", "America/Edmonton"),
    ("canada_pacific", "America/Vancouver"),
    ("canada_newfoundland", "America/St_Johns"),
    // North America - Mexico
    ("mexico_central", "America/Mexico_City"),
    ("mexico_pacific", "America/Mazatlan"),
    // South America
    ("brazil_eastern", "America/Sao_Paulo"),
    ("brazil_western", "America/Manaus"),
    ("argentina", "America/Argentina/Buenos_Aires"),
    ("chile", "America/Santiago"),
    ("colombia", "America/Bogota"),
    ("peru", "America/Lima"),
    ("venezuela", "America/Caracas"),
    // Europe - Western
    ("europe_london", "Europe/London"),
    ("europe_dublin", "Europe/Dublin"),
    ("europe_lisbon", "Europe/Lisbon"),
    ("europe_reykjavik", "Atlantic/Reykjavik"),
    // Europe - Central
    ("europe_paris", "Europe/Paris"),
    ("europe_berlin", "Europe/Berlin"),
    ("europe_rome", "Europe/Rome"),
    ("europe_madrid", "Europe/Madrid"),
    ("europe_amsterdam", "Europe/Amsterdam"),
    ("europe_brussels", "Europe/Brussels"),
    ("europe_vienna", "Europe/Vienna"),
    ("europe_zurich", "Europe/Zurich"),
    ("europe_stockholm", "Europe/Stockholm"),
    ("europe_oslo", "Europe/Oslo"),
    ("europe_copenhagen", "Europe/Copenhagen"),
    ("europe_warsaw", "Europe/Warsaw"),
    ("europe_prague", "Europe/Prague"),
    // Europe - Eastern
    ("europe_athens", "Europe/Athens"),
    ("europe_bucharest", "Europe/Bucharest"),
    ("europe_helsinki", "Europe/Helsinki"),
    ("europe_istanbul", "Europe/Istanbul"),
    ("europe_kyiv", "Europe/Kiev"),
    ("europe_moscow", "Europe/Moscow"),
    // Middle East
    ("middle_east_dubai", "Asia/Dubai"),
    ("middle_east_riyadh", "Asia/Riyadh"),
    ("israel", "Asia/Jerusalem"),
    // Africa
    ("africa_cairo", "Africa/Cairo"),
    ("africa_johannesburg", "Africa/Johannesburg"),
    ("africa_lagos", "Africa/Lagos"),
    ("africa_nairobi", "Africa/Nairobi"),
    // Asia
    ("india", "Asia/Kolkata"),
    ("china", "Asia/Shanghai"),
    ("japan", "Asia/Tokyo"),
    ("korea", "Asia/Seoul"),
    ("singapore", "Asia/Singapore"),
    ("hong_kong", "Asia/Hong_Kong"),
    ("thailand", "Asia/Bangkok"),
    ("indonesia_western", "Asia/Jakarta"),
    ("philippines", "Asia/Manila"),
    // Oceania
    ("australia_eastern", "Australia/Sydney"),
    ("australia_central", "Australia/Adelaide"),
    ("australia_western", "Australia/Perth"),
    ("new_zealand", "Pacific/Auckland"),
    // UTC
    ("utc", "UTC"),
];

/// Resolve a user-provided timezone to an IANA identifier.
///
/// Accepts a friendly key (e.g. `us_eastern`) or an IANA identifier that
/// appears in the table (e.g. `America/New_York`).
pub fn resolve(timezone: &str) -> Result<&'static str, NocturneError> {
    for (key, iana) in TIMEZONE_MAP {
        if *key == timezone || *iana == timezone {
            return Ok(iana);
        }
    }
    Err(NocturneError::InvalidTimezone(timezone.to_string()))
}
