//! Mission clock helpers.
//!
//! Pressure files and the event catalog carry three notions of time: the
//! Earth UTC stamp of the sample, the local true solar time label
//! (`"SSSSS HH:MM:SS"`), and a derived *local civil timestamp* in which sol
//! `n` is mapped onto the calendar day `MISSION_EPOCH + n days`. All window
//! arithmetic in this crate happens on the local civil timestamp.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Calendar date that sol 0 is mapped onto.
pub const MISSION_EPOCH: (i32, u32, u32) = (2018, 11, 26);

/// Format of UTC stamps in instrument files (`2019-083T12:01:02.345Z`).
pub const UTC_FORMAT: &str = "%Y-%jT%H:%M:%S%.fZ";

/// Format used when writing local civil timestamps.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Width of one season bin in degrees of solar longitude.
pub const SEASON_BIN_DEGREES: u16 = 30;

/// Seasonal bins keyed by Earth calendar ranges (inclusive on both ends).
const SEASON_TABLE: &[((i32, u32, u32), (i32, u32, u32), u16)] = &[
    ((2019, 3, 23), (2019, 5, 24), 0),
    ((2021, 2, 7), (2021, 4, 10), 0),
    ((2019, 5, 25), (2019, 7, 30), 30),
    ((2021, 4, 11), (2021, 6, 16), 30),
    ((2019, 7, 31), (2019, 10, 7), 60),
    ((2021, 6, 17), (2021, 8, 24), 60),
    ((2019, 10, 8), (2019, 12, 12), 90),
    ((2021, 8, 25), (2021, 10, 29), 90),
    ((2019, 12, 13), (2020, 2, 11), 120),
    ((2021, 10, 30), (2021, 12, 29), 120),
    ((2020, 2, 12), (2020, 4, 7), 150),
    ((2021, 12, 30), (2022, 2, 23), 150),
    ((2020, 4, 8), (2020, 5, 28), 180),
    ((2022, 2, 24), (2022, 4, 15), 180),
    ((2020, 5, 29), (2020, 7, 15), 210),
    ((2022, 4, 16), (2022, 6, 2), 210),
    ((2020, 7, 16), (2020, 9, 1), 240),
    ((2018, 10, 16), (2018, 12, 3), 270),
    ((2020, 9, 2), (2020, 10, 20), 270),
    ((2018, 12, 4), (2019, 1, 24), 300),
    ((2020, 10, 21), (2020, 12, 21), 300),
    ((2019, 1, 25), (2019, 3, 22), 330),
    ((2020, 12, 22), (2021, 2, 6), 330),
];

fn ymd(date: (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
}

/// Calendar date that the given sol is mapped onto.
///
/// Sols above [`MAX_SOL`] are clamped to it; callers taking a sol from
/// outside the crate reject those first.
pub fn sol_date(sol: u32) -> NaiveDate {
    let epoch = ymd(MISSION_EPOCH).unwrap_or_default();
    epoch + Duration::days(i64::from(sol.min(MAX_SOL)))
}

/// Midnight of the given sol on the local civil clock.
pub fn sol_start(sol: u32) -> NaiveDateTime {
    sol_date(sol).and_time(NaiveTime::MIN)
}

/// Build the local civil timestamp of an event from its sol and decimal
/// LTST hour, borrowing the sub-second part from the event's UTC stamp.
///
/// Minutes and seconds are truncated, not rounded.
pub fn local_time_from_ltst_hours(sol: u32, ltst_hours: f64, subsec_nanos: u32) -> Option<NaiveDateTime> {
    if !ltst_hours.is_finite() || !(0.0..24.0).contains(&ltst_hours) {
        return None;
    }
    let hours = ltst_hours.trunc();
    let minutes = ((ltst_hours - hours) * 60.0).trunc();
    let seconds = (((ltst_hours - hours) * 60.0 - minutes) * 60.0).trunc();
    let time = NaiveTime::from_hms_nano_opt(hours as u32, minutes as u32, seconds as u32, subsec_nanos)?;
    Some(sol_date(sol).and_time(time))
}

/// Parse an instrument UTC stamp in day-of-year form.
pub fn parse_utc(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), UTC_FORMAT)
}

/// Parse a local civil timestamp as written by [`LOCAL_TIME_FORMAT`].
///
/// The fractional part is optional.
pub fn parse_local_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
}

/// Split an LTST label (`"00123 14:05:09"`) into its sol and time of day.
pub fn parse_ltst_label(label: &str) -> Option<(u32, NaiveTime)> {
    let mut parts = label.split_whitespace();
    let sol = parts.next()?.parse::<u32>().ok().filter(|s| *s <= MAX_SOL)?;
    let time = NaiveTime::parse_from_str(parts.next()?, "%H:%M:%S").ok()?;
    Some((sol, time))
}

/// Largest sol an LTST label can carry.
pub const MAX_SOL: u32 = 99_999;

/// Zero-padded 5-digit sol prefix used by LTST labels.
pub fn ltst_prefix(sol: u32) -> String {
    format!("{:05}", sol)
}

/// Seasonal solar-longitude bin (0, 30, ..., 330) for an Earth UTC stamp.
///
/// Returns `None` when the date falls outside the mission tables.
pub fn solar_longitude_bin(utc: NaiveDateTime) -> Option<u16> {
    let day = utc.date();
    SEASON_TABLE.iter().find_map(|(start, end, ls)| {
        let (start, end) = (ymd(*start)?, ymd(*end)?);
        (start <= day && day <= end).then_some(*ls)
    })
}

/// Round an arbitrary solar longitude down onto the season grid.
pub fn pseudo_ls(ls: u16) -> u16 {
    (ls / SEASON_BIN_DEGREES) * SEASON_BIN_DEGREES % 360
}

/// Seconds from `from` to `to` as a float (negative when `to` precedes `from`).
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

/// Convert fractional seconds into a chrono duration (nanosecond precision).
pub fn duration_from_secs(seconds: f64) -> Duration {
    Duration::nanoseconds((seconds * 1e9).round() as i64)
}

/// Sub-second part of a timestamp in nanoseconds.
pub fn subsec_nanos(timestamp: NaiveDateTime) -> u32 {
    timestamp.nanosecond() % 1_000_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sol_date_mapping() {
        assert_eq!(sol_date(0), NaiveDate::from_ymd_opt(2018, 11, 26).unwrap());
        assert_eq!(sol_date(10), NaiveDate::from_ymd_opt(2018, 12, 6).unwrap());
        assert_eq!(sol_date(u32::MAX), sol_date(MAX_SOL));
    }

    #[test]
    fn test_local_time_from_ltst_hours_truncates() {
        // 13.5125 h = 13:30:45
        let t = local_time_from_ltst_hours(5, 13.5125, 250_000_000).unwrap();
        assert_eq!(t.date(), sol_date(5));
        assert_eq!(t.hour(), 13);
        assert_eq!(t.minute(), 30);
        assert!(t.second() == 44 || t.second() == 45);
        assert_eq!(t.nanosecond(), 250_000_000);

        assert!(local_time_from_ltst_hours(5, 25.0, 0).is_none());
        assert!(local_time_from_ltst_hours(5, f64::NAN, 0).is_none());
    }

    #[test]
    fn test_parse_utc_day_of_year() {
        let t = parse_utc("2019-083T12:01:02.345Z").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2019, 3, 24).unwrap());
        assert_eq!(t.nanosecond(), 345_000_000);
    }

    #[test]
    fn test_parse_local_time_with_and_without_fraction() {
        let a = parse_local_time("2019-01-01 10:00:00.500000").unwrap();
        let b = parse_local_time("2019-01-01 10:00:00").unwrap();
        assert_eq!(seconds_between(b, a), 0.5);
    }

    #[test]
    fn test_parse_ltst_label() {
        let (sol, time) = parse_ltst_label("00123 14:05:09").unwrap();
        assert_eq!(sol, 123);
        assert_eq!(time, NaiveTime::from_hms_opt(14, 5, 9).unwrap());
        assert!(parse_ltst_label("garbage").is_none());
        assert!(parse_ltst_label("4000000000 12:00:00").is_none());
        assert_eq!(ltst_prefix(42), "00042");
    }

    #[test]
    fn test_season_lookup() {
        let utc = parse_utc("2019-100T00:00:00.000Z").unwrap(); // 2019-04-10
        assert_eq!(solar_longitude_bin(utc), Some(0));
        // Inclusive on the last day of a range, including its afternoon.
        let end = parse_utc("2019-144T18:00:00.000Z").unwrap(); // 2019-05-24
        assert_eq!(solar_longitude_bin(end), Some(0));
        let before_mission = parse_utc("2017-001T00:00:00.000Z").unwrap();
        assert_eq!(solar_longitude_bin(before_mission), None);
    }

    #[test]
    fn test_pseudo_ls() {
        assert_eq!(pseudo_ls(0), 0);
        assert_eq!(pseudo_ls(47), 30);
        assert_eq!(pseudo_ls(359), 330);
        assert_eq!(pseudo_ls(365), 0);
    }

    #[test]
    fn test_seconds_roundtrip() {
        let t0 = sol_start(3);
        let t1 = t0 + duration_from_secs(12.25);
        assert!((seconds_between(t0, t1) - 12.25).abs() < 1e-9);
        assert!((seconds_between(t1, t0) + 12.25).abs() < 1e-9);
    }
}
