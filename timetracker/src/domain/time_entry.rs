use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{dates, Selection, TimeTrackerError};

/// Leave entries book time against the absence project and carry no focal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveKind {
    Pto,
    Vacation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    #[default]
    Work,
    Leave(LeaveKind),
}

impl EntryKind {
    pub fn from_flags(pto: bool, vacation: bool) -> Result<Self, TimeTrackerError> {
        match (pto, vacation) {
            (true, true) => Err(TimeTrackerError::validation(
                "an entry cannot be both PTO and vacation",
            )),
            (true, false) => Ok(Self::Leave(LeaveKind::Pto)),
            (false, true) => Ok(Self::Leave(LeaveKind::Vacation)),
            (false, false) => Ok(Self::Work),
        }
    }

    pub fn is_leave(&self) -> bool {
        matches!(self, Self::Leave(_))
    }

    pub fn requires_focal(&self) -> bool {
        !self.is_leave()
    }
}

impl FromStr for EntryKind {
    type Err = TimeTrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "work" => Ok(Self::Work),
            "pto" => Ok(Self::Leave(LeaveKind::Pto)),
            "vacation" | "vacations" => Ok(Self::Leave(LeaveKind::Vacation)),
            other => Err(TimeTrackerError::validation(format!(
                "unknown entry kind \"{}\", expected work, pto or vacation",
                other
            ))),
        }
    }
}

/// A positive amount of hours for one day, kept to the two decimals the portal accepts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Hours(f64);

impl Hours {
    pub fn new(hours: f64) -> Result<Self, TimeTrackerError> {
        // Checked after rounding, so nothing below 0.005 turns into "0.00".
        let rounded = (hours * 100.0).round() / 100.0;
        if !rounded.is_finite() || rounded <= 0.0 || rounded > 24.0 {
            return Err(TimeTrackerError::validation(format!(
                "{} is not a valid amount of hours, expected a number between 0 and 24",
                hours
            )));
        }
        Ok(Self(rounded))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Serialization used in the hours field, e.g. `3.50`.
    pub fn as_form_value(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl FromStr for Hours {
    type Err = TimeTrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(',', ".");
        let hours: f64 = normalized.parse().map_err(|_| {
            TimeTrackerError::validation(format!("\"{}\" is not a number of hours", s.trim()))
        })?;
        Self::new(hours)
    }
}

impl std::fmt::Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_form_value())
    }
}

/// A time entry whose every choice has been matched against the portal's options.
#[derive(Debug, Clone, Serialize)]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub project: Selection,
    pub category: Selection,
    pub task: Selection,
    pub hours: Hours,
    pub comment: String,
    pub focal: Option<Selection>,
}

impl TimeEntry {
    pub fn date_field(&self) -> String {
        dates::format_form_date(self.date)
    }
}
