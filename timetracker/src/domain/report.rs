use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;

/// One booked entry as the list page shows it. Values are kept exactly as rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub date: String,
    pub hours: String,
    pub project: String,
    pub category: String,
    pub description: String,
}

impl ReportRow {
    /// Builds a row from the cells of one table row. Rows with fewer than five cells
    /// are not entries.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        match cells {
            [date, hours, project, category, description, ..] => Some(Self {
                date: date.clone(),
                hours: hours.clone(),
                project: project.clone(),
                category: category.clone(),
                description: description.clone(),
            }),
            _ => None,
        }
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        dates::parse_form_date(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Neither bound was given, so the range is the current month up to today.
    pub current_month: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub range: ReportRange,
    pub rows: Vec<ReportRow>,
    /// The portal's own aggregate, taken from the table's last row.
    pub total_hours: Option<String>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportQuery {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn current_month() -> Self {
        Self::default()
    }

    /// Fills missing bounds: the end defaults to `today`, the start to the first day
    /// of the end's month.
    pub fn resolve(&self, today: NaiveDate) -> ReportRange {
        let end = self.end.unwrap_or(today);
        let start = self.start.unwrap_or_else(|| dates::begin_of_month(end));

        ReportRange {
            start,
            end,
            current_month: self.start.is_none() && self.end.is_none(),
        }
    }
}
