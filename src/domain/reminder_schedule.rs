use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};

use regex::Regex;

/// Calendar day a reminder falls on, written as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderDate(NaiveDate);

impl FromStr for ReminderDate {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            static ref DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
        }

        let value = value.trim();
        if !DATE_REGEX.is_match(value) {
            return Err(format!("{} is not a YYYY-MM-DD date", value));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| format!("{} is not a valid calendar date", value))
    }
}

impl From<ReminderDate> for NaiveDate {
    fn from(value: ReminderDate) -> Self {
        value.0
    }
}

/// Wall-clock time of a reminder, written as 24-hour `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime(NaiveTime);

impl FromStr for ReminderTime {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            static ref TIME_REGEX: Regex = Regex::new(r"^\d{2}:\d{2}$").unwrap();
        }

        let value = value.trim();
        if !TIME_REGEX.is_match(value) {
            return Err(format!("{} is not an HH:MM time", value));
        }
        NaiveTime::parse_from_str(value, "%H:%M")
            .map(Self)
            .map_err(|_| format!("{} is not a valid time of day", value))
    }
}

impl From<ReminderTime> for NaiveTime {
    fn from(value: ReminderTime) -> Self {
        value.0
    }
}
