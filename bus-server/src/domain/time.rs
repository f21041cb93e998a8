//! Schedule time handling for DataMall bus routes.
//!
//! DataMall provides first/last bus times as 4-digit "HHMM" strings, one
//! pair per calendar class (weekday, Saturday, Sunday). Services that run
//! past midnight report a last bus such as "0030", which is earlier in the
//! day than their first bus.

use chrono::{NaiveTime, Weekday};

/// Error returned when parsing an invalid schedule time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid schedule time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time of day from "HHMM" format.
///
/// # Examples
///
/// ```
/// use bus_server::domain::parse_hhmm;
///
/// let t = parse_hhmm("0530").unwrap();
/// assert_eq!(t.to_string(), "05:30:00");
///
/// assert!(parse_hhmm("05:30").is_err());
/// assert!(parse_hhmm("2400").is_err());
/// assert!(parse_hhmm("-").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    let bytes = s.as_bytes();
    if bytes.len() != 4 {
        return Err(TimeError::new("expected HHMM format"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[2..4]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// Calendar class used to pick a schedule bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    /// Saturday and Sunday have their own buckets; every other day is a weekday.
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Weekday,
        }
    }
}

/// First and last bus for one calendar class, as published.
///
/// The raw strings are kept because the after-midnight check looks at the
/// leading character of the last-bus value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingWindow {
    pub first_bus: String,
    pub last_bus: String,
}

impl OperatingWindow {
    pub fn new(first_bus: impl Into<String>, last_bus: impl Into<String>) -> Self {
        Self {
            first_bus: first_bus.into(),
            last_bus: last_bus.into(),
        }
    }

    pub fn first_bus_time(&self) -> Result<NaiveTime, TimeError> {
        parse_hhmm(&self.first_bus)
    }

    pub fn last_bus_time(&self) -> Result<NaiveTime, TimeError> {
        parse_hhmm(&self.last_bus)
    }

    /// Whether the last bus is published as an early-morning hour ("0HMM"),
    /// taken to mean it runs on the following calendar day.
    pub fn last_bus_after_midnight(&self) -> bool {
        self.last_bus.starts_with('0')
    }
}

/// Operating windows of one service at one stop, for each calendar class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub weekday: OperatingWindow,
    pub saturday: OperatingWindow,
    pub sunday: OperatingWindow,
}

impl WeeklySchedule {
    /// The window that applies on the given calendar class.
    pub fn window(&self, day: DayType) -> &OperatingWindow {
        match day {
            DayType::Weekday => &self.weekday,
            DayType::Saturday => &self.saturday,
            DayType::Sunday => &self.sunday,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn valid_times_parse(hour in 0u32..24, minute in 0u32..60) {
            let t = parse_hhmm(&format!("{:02}{:02}", hour, minute)).unwrap();
            prop_assert_eq!(t.hour(), hour);
            prop_assert_eq!(t.minute(), minute);
        }
    }
}
