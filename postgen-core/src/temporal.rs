//! Reconstruction of absolute instants from the form's date and time fragments.
//!
//! The form records three loose strings per submission:
//! - a submission timestamp, `M/D/YYYY H:M:S` on a 24-hour clock
//! - an event date, `M/D` with no year
//! - start and end times, `H:M:S AM` / `H:M:S PM`
//!
//! The event year is borrowed from the submission timestamp.

use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

use crate::error::Rejection;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("expected {expected} '{sep}'-separated fields in '{input}'")]
    Shape {
        input: String,
        expected: usize,
        sep: char,
    },

    #[error("'{0}' is not a number")]
    Number(String),

    #[error("missing AM/PM marker in '{0}'")]
    MissingMeridian(String),

    #[error("unknown meridian '{0}'")]
    Meridian(String),

    #[error("{0} is not a valid calendar date")]
    InvalidDate(String),

    #[error("{0} is not a valid time of day")]
    InvalidTime(String),
}

impl From<TimeParseError> for Rejection {
    fn from(e: TimeParseError) -> Self {
        Rejection::Malformed(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridian {
    Am,
    Pm,
}

impl FromStr for Meridian {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("AM") {
            Ok(Meridian::Am)
        } else if s.eq_ignore_ascii_case("PM") {
            Ok(Meridian::Pm)
        } else {
            Err(TimeParseError::Meridian(s.to_string()))
        }
    }
}

/// Parse the form's `M/D/YYYY H:M:S` submission timestamp.
pub fn parse_submission_timestamp(input: &str) -> Result<NaiveDateTime, TimeParseError> {
    let (date, time) = split_pair(input)?;

    let [month, day, year] = numeric_fields::<3>(date, '/')?;
    let [hour, minute, second] = numeric_fields::<3>(time, ':')?;

    let year = i32::try_from(year).map_err(|_| TimeParseError::Number(year.to_string()))?;
    let date = calendar_date(year, month, day)?;
    let time = clock_time(hour, minute, second)?;

    Ok(date.and_time(time))
}

/// Build the instant for an `M/D` event date and an `H:M:S AM|PM` time.
///
/// `12:xx AM` becomes hour 0 of the *following* day. Form submitters enter
/// midnight starts against the evening they belong to, so the calendar day
/// moves forward with the clock.
pub fn parse_event_instant(
    date: &str,
    year: i32,
    time: &str,
) -> Result<NaiveDateTime, TimeParseError> {
    let (clock, meridian) = split_pair(time)
        .map_err(|_| TimeParseError::MissingMeridian(time.trim().to_string()))?;
    let meridian: Meridian = meridian.parse()?;

    let [mut hour, minute, second] = numeric_fields::<3>(clock, ':')?;
    let [month, day] = numeric_fields::<2>(date, '/')?;

    let mut next_day = false;
    match meridian {
        Meridian::Pm if hour < 12 => hour += 12,
        Meridian::Am if hour == 12 => {
            hour = 0;
            next_day = true;
        }
        _ => {}
    }

    let mut date = calendar_date(year, month, day)?;
    if next_day {
        date = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| TimeParseError::InvalidDate(format!("{month}/{day}/{year} + 1 day")))?;
    }
    let time = clock_time(hour, minute, second)?;

    Ok(date.and_time(time))
}

/// Move an end instant that lands before its start onto the next day.
///
/// Start and end share one stated date, so an evening event ending after
/// midnight parses with an end earlier than its start.
pub fn roll_end_past_start(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
    if end < start {
        end + TimeDelta::days(1)
    } else {
        end
    }
}

fn split_pair(input: &str) -> Result<(&str, &str), TimeParseError> {
    let mut parts = input.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(TimeParseError::Shape {
            input: input.to_string(),
            expected: 2,
            sep: ' ',
        }),
    }
}

fn numeric_fields<const N: usize>(input: &str, sep: char) -> Result<[u32; N], TimeParseError> {
    let pieces: Vec<&str> = input.trim().split(sep).collect();
    if pieces.len() != N {
        return Err(TimeParseError::Shape {
            input: input.to_string(),
            expected: N,
            sep,
        });
    }

    let mut out = [0u32; N];
    for (slot, piece) in out.iter_mut().zip(pieces) {
        let piece = piece.trim();
        *slot = piece
            .parse()
            .map_err(|_| TimeParseError::Number(piece.to_string()))?;
    }
    Ok(out)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| TimeParseError::InvalidDate(format!("{month}/{day}/{year}")))
}

fn clock_time(hour: u32, minute: u32, second: u32) -> Result<NaiveTime, TimeParseError> {
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| TimeParseError::InvalidTime(format!("{hour}:{minute:02}:{second:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_submission_timestamp() {
        let ts = parse_submission_timestamp("7/28/2016 21:04:09").unwrap();
        assert_eq!(ts.year(), 2016);
        assert_eq!(ts.month(), 7);
        assert_eq!(ts.day(), 28);
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (21, 4, 9));
    }

    #[test]
    fn test_parse_submission_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_submission_timestamp("yesterday"),
            Err(TimeParseError::Shape { .. })
        ));
        assert!(matches!(
            parse_submission_timestamp("7/xx/2016 21:04:09"),
            Err(TimeParseError::Number(_))
        ));
        assert!(matches!(
            parse_submission_timestamp("2/30/2016 21:04:09"),
            Err(TimeParseError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_pm_adds_twelve_hours() {
        let t = parse_event_instant("7/30", 2016, "9:00:00 PM").unwrap();
        assert_eq!(t, at(2016, 7, 30, 21, 0));
    }

    #[test]
    fn test_noon_pm_stays_noon() {
        let t = parse_event_instant("7/30", 2016, "12:30:00 PM").unwrap();
        assert_eq!(t, at(2016, 7, 30, 12, 30));
    }

    #[test]
    fn test_am_morning_unchanged() {
        let t = parse_event_instant("7/30", 2016, "9:15:00 AM").unwrap();
        assert_eq!(t, at(2016, 7, 30, 9, 15));
    }

    // Midnight starts belong to the next calendar day.
    #[test]
    fn test_twelve_am_moves_to_next_day() {
        let t = parse_event_instant("7/30", 2016, "12:00:00 AM").unwrap();
        assert_eq!(t, at(2016, 7, 31, 0, 0));
    }

    #[test]
    fn test_twelve_am_crosses_month_end() {
        let t = parse_event_instant("1/31", 2017, "12:00:00 AM").unwrap();
        assert_eq!(t, at(2017, 2, 1, 0, 0));
    }

    #[test]
    fn test_twelve_am_crosses_leap_day() {
        let t = parse_event_instant("2/28", 2016, "12:45:00 AM").unwrap();
        assert_eq!(t, at(2016, 2, 29, 0, 45));

        let t = parse_event_instant("2/28", 2017, "12:45:00 AM").unwrap();
        assert_eq!(t, at(2017, 3, 1, 0, 45));
    }

    #[test]
    fn test_twelve_am_on_new_years_eve_moves_year() {
        let t = parse_event_instant("12/31", 2016, "12:00:00 AM").unwrap();
        assert_eq!(t, at(2017, 1, 1, 0, 0));
    }

    #[test]
    fn test_event_instant_rejects_bad_fragments() {
        assert!(matches!(
            parse_event_instant("7/30", 2016, "9:00:00"),
            Err(TimeParseError::MissingMeridian(_))
        ));
        assert!(matches!(
            parse_event_instant("7/30", 2016, "9:00:00 XM"),
            Err(TimeParseError::Meridian(_))
        ));
        assert!(matches!(
            parse_event_instant("7/30", 2016, "nine:00:00 AM"),
            Err(TimeParseError::Number(_))
        ));
        assert!(matches!(
            parse_event_instant("2/30", 2016, "9:00:00 AM"),
            Err(TimeParseError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_event_instant("7/30", 2016, "9:75:00 AM"),
            Err(TimeParseError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_end_before_start_rolls_exactly_one_day() {
        let start = parse_event_instant("7/30", 2016, "9:00:00 PM").unwrap();
        let naive_end = parse_event_instant("7/30", 2016, "1:00:00 AM").unwrap();
        assert!(naive_end < start);

        let end = roll_end_past_start(start, naive_end);
        assert_eq!(end - naive_end, TimeDelta::hours(24));
        assert_eq!(end, at(2016, 7, 31, 1, 0));
    }

    #[test]
    fn test_end_after_start_untouched() {
        let start = at(2016, 7, 30, 9, 0);
        let end = at(2016, 7, 30, 11, 0);
        assert_eq!(roll_end_past_start(start, end), end);
    }

    #[test]
    fn test_rejection_from_time_error() {
        let rejection: Rejection = TimeParseError::Number("x".into()).into();
        assert!(matches!(rejection, Rejection::Malformed(_)));
    }
}
