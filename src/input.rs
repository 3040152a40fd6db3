use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::FinderError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_timezone(name: &str) -> Result<Tz, FinderError> {
    Tz::from_str(name.trim())
        .map_err(|_| FinderError::Input(format!("unrecognized timezone: {}", name)))
}

/// Parse a user-entered date/time. Inputs with an explicit offset (RFC 3339)
/// are taken as-is; naive inputs are interpreted in the given timezone.
pub fn parse_instant(input: &str, tz: Tz) -> Result<DateTime<Utc>, FinderError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = parse_naive(input)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(..) => Err(FinderError::Input(format!(
            "{} is ambiguous in {} (clocks fall back over it)",
            input, tz
        ))),
        LocalResult::None => Err(FinderError::Input(format!(
            "{} does not exist in {} (clocks skip over it)",
            input, tz
        ))),
    }
}

fn parse_naive(input: &str) -> Result<NaiveDateTime, FinderError> {
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }
    // A bare date means midnight.
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(FinderError::Input(format!(
        "could not parse date/time: {}",
        input
    )))
}

pub fn format_instant(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}
