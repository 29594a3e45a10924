//! Turning what a person types for a date into a calendar date, and calendar dates into
//! the `dd/mm/yyyy` form the portal expects.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;

use crate::TimeTrackerError;

pub const FORM_DATE_FORMAT: &str = "%d/%m/%Y";

const ACCEPTED_FORMS: &str = "Please use 'dd/mm/yyyy' format. Values like 'today', 'yesterday', \
    'today-3', '3 days ago', 'last week' or 'monday' are also allowed.";

static RELATIVE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(today|yesterday)(?:\s*-\s*(\d+))?$").unwrap());
static UNITS_AGO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*(day|days|week|weeks)\s+ago$").unwrap());
static DAY_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn format_form_date(date: NaiveDate) -> String {
    date.format(FORM_DATE_FORMAT).to_string()
}

/// Parses a `dd/mm/yyyy` date as printed by the portal.
pub fn parse_form_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), FORM_DATE_FORMAT).ok()
}

pub fn begin_of_month(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Interprets `text` relative to `today`.
pub fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, TimeTrackerError> {
    let normalized = text.trim().to_lowercase();
    parse_normalized(&normalized, today).ok_or_else(|| {
        TimeTrackerError::validation(format!("{} is not a valid date.\n\n{}", text.trim(), ACCEPTED_FORMS))
    })
}

fn parse_normalized(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(cap) = RELATIVE_DAY.captures(text) {
        let mut days_before: u64 = cap.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if &cap[1] == "yesterday" {
            days_before += 1;
        }
        return today.checked_sub_days(Days::new(days_before));
    }

    if let Some(cap) = UNITS_AGO.captures(text) {
        let count: u64 = cap[1].parse().ok()?;
        let days = if cap[2].starts_with("week") { count.checked_mul(7)? } else { count };
        return today.checked_sub_days(Days::new(days));
    }

    if text == "last week" {
        return today.checked_sub_days(Days::new(7));
    }

    if let Some(weekday) = parse_weekday(text) {
        let back = (7 + today.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
        return today.checked_sub_days(Days::new(back as u64));
    }

    if let Some(cap) = DAY_MONTH_YEAR.captures(text) {
        return NaiveDate::from_ymd_opt(cap[3].parse().ok()?, cap[2].parse().ok()?, cap[1].parse().ok()?);
    }

    if let Some(cap) = ISO_DATE.captures(text) {
        return NaiveDate::from_ymd_opt(cap[1].parse().ok()?, cap[2].parse().ok()?, cap[3].parse().ok()?);
    }

    None
}

fn parse_weekday(text: &str) -> Option<Weekday> {
    match text {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
