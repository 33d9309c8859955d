//! Time related utils.

use chrono::NaiveDateTime;
use chrono::Utc;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Date and time without the zone, as used by RFC 2616: "Sun, 06 Nov 1994 08:49:37"
const RFC2616_WITHOUT_ZONE: &str = "%a, %d %b %Y %H:%M:%S";

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into RFC 2616 (HTTP date): "Sun, 06 Nov 1994 08:49:37 GMT"
pub fn format_rfc2616(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an RFC 2616 date: "Sun, 06 Nov 1994 08:49:37 GMT".
///
/// The trailing zone abbreviation must be alphabetic and is not interpreted,
/// the time is always taken as UTC.
pub fn parse_rfc2616(s: &str) -> Option<DateTime> {
    let (datetime, zone) = s.trim().rsplit_once(' ')?;
    if zone.is_empty() || !zone.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    NaiveDateTime::parse_from_str(datetime, RFC2616_WITHOUT_ZONE)
        .ok()
        .map(|t| t.and_utc())
}

/// Epoch seconds of `t` rounded half up to the nearest second.
pub fn round_to_second(t: DateTime) -> i64 {
    let secs = t.timestamp();
    if t.timestamp_subsec_nanos() >= 500_000_000 {
        secs + 1
    } else {
        secs
    }
}
