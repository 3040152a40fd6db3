use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

use block_finder::error::FinderError;
use block_finder::input::{format_instant, parse_instant, parse_timezone};

#[test]
fn test_rfc3339_offset_wins_over_session_timezone() {
    let instant = parse_instant("2024-01-15T12:00:00+02:00", Tz::America__New_York).unwrap();
    assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
}

#[test]
fn test_naive_input_is_interpreted_in_session_timezone() {
    // New York is UTC-5 in January.
    let instant = parse_instant("2024-01-15 12:00", Tz::America__New_York).unwrap();
    assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap());
}

#[test]
fn test_bare_date_means_midnight() {
    let instant = parse_instant("2024-01-15", Tz::UTC).unwrap();
    assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
}

#[test]
fn test_seconds_are_optional() {
    let with_seconds = parse_instant("2024-01-15 12:00:30", Tz::UTC).unwrap();
    let without = parse_instant("2024-01-15 12:00", Tz::UTC).unwrap();
    assert_eq!(with_seconds.timestamp() - without.timestamp(), 30);
}

#[test]
fn test_nonexistent_local_time_is_rejected() {
    // Spring-forward gap: 02:30 never happens on this date in New York.
    let err = parse_instant("2024-03-10 02:30", Tz::America__New_York).unwrap_err();
    assert!(matches!(err, FinderError::Input(_)));
}

#[test]
fn test_ambiguous_local_time_is_rejected() {
    // Fall-back fold: 01:30 happens twice on this date in New York.
    let err = parse_instant("2024-11-03 01:30", Tz::America__New_York).unwrap_err();
    assert!(matches!(err, FinderError::Input(_)));
}

#[test]
fn test_garbage_input_is_rejected() {
    let err = parse_instant("next tuesday", Tz::UTC).unwrap_err();
    assert!(matches!(err, FinderError::Input(_)));
}

#[test]
fn test_parse_timezone_recognizes_iana_names() {
    assert_eq!(parse_timezone("Europe/Kyiv").unwrap(), Tz::Europe__Kyiv);
    assert!(matches!(
        parse_timezone("Mars/Olympus_Mons").unwrap_err(),
        FinderError::Input(_)
    ));
}

#[test]
fn test_format_instant_renders_in_timezone() {
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap();
    assert_eq!(
        format_instant(instant, Tz::America__New_York),
        "2024-01-15 12:00:00 EST"
    );
}
