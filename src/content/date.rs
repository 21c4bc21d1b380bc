//! Publication date handling

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `2024-01-15-some-title` style file stems
    static ref DATED_STEM: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").unwrap();
}

/// Format used when writing dates back into a header
pub const HEADER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Timed formats that carry their own offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y/%m/%d %H:%M:%S %z",
    "%Y/%m/%d %H:%M %z",
];

/// Timed formats interpreted in the site timezone
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a front-matter date.
///
/// Values with an explicit offset keep it. Values without one are placed in
/// `tz`, or UTC when no timezone is configured. Returns `None` for anything
/// that is not a real calendar date.
pub fn parse_date(s: &str, tz: Option<Tz>) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    // A trailing `Z` is UTC; chrono's `%z` only takes numeric offsets
    let zulu;
    let s = match s.strip_suffix('Z') {
        Some(rest) => {
            zulu = format!("{}+0000", rest.trim_end());
            zulu.as_str()
        }
        None => s,
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(localize(naive, tz));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(localize(d.and_hms_opt(0, 0, 0)?, tz));
        }
    }

    None
}

/// Place a naive datetime in the site timezone
pub fn localize(naive: NaiveDateTime, tz: Option<Tz>) -> DateTime<FixedOffset> {
    match tz {
        Some(tz) => tz
            .from_local_datetime(&naive)
            .earliest()
            // Inside a DST gap there is no local reading; fall back to UTC wall time
            .unwrap_or_else(|| tz.from_utc_datetime(&naive))
            .fixed_offset(),
        None => DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset(),
    }
}

/// Render a date the way headers store it
pub fn format_header_date(date: &DateTime<FixedOffset>) -> String {
    date.format(HEADER_DATE_FORMAT).to_string()
}

/// Split a `YYYY-MM-DD-rest` file stem into its date and the remainder.
///
/// Stems whose prefix is not a valid calendar date are returned undated.
pub fn split_dated_stem(stem: &str) -> (Option<NaiveDate>, &str) {
    if let Some(caps) = DATED_STEM.captures(stem) {
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or(stem);
        if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
            return (Some(date), rest);
        }
    }
    (None, stem)
}
