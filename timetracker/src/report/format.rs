use chrono::Datelike;
use tabled::{builder::Builder, settings::Style};

use crate::{Report, ReportRow};

const CONDENSED_HEADERS: [&str; 2] = ["Date", "Description"];
const FULL_HEADERS: [&str; 5] = ["Date", "Hours", "Project", "Assignment Type", "Description"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Show every column and a total row.
    pub full: bool,
    /// Prefix every row with its day of the week.
    pub weekday: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}

pub fn format_report(report: &Report, options: FormatOptions) -> ReportTable {
    let mut headers: Vec<String> = if options.full {
        FULL_HEADERS.iter().map(|h| h.to_string()).collect()
    } else {
        CONDENSED_HEADERS.iter().map(|h| h.to_string()).collect()
    };
    if options.weekday {
        headers.insert(0, "Weekday".to_string());
    }

    let mut rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| {
            let date = display_date(row, report.range.current_month);
            let mut values = if options.full {
                vec![
                    date,
                    row.hours.clone(),
                    row.project.clone(),
                    row.category.clone(),
                    row.description.clone(),
                ]
            } else {
                vec![date, row.description.clone()]
            };
            if options.weekday {
                values.insert(0, weekday_label(row));
            }
            values
        })
        .collect();

    if options.full {
        let mut total = vec![String::new(); headers.len()];
        let hours_column = if options.weekday { 2 } else { 1 };
        total[hours_column] = report.total_hours.clone().unwrap_or_default();
        rows.push(total);
    }

    ReportTable { headers, rows }
}

/// Day of month only when the report covers the current month, since month and year
/// are implied.
fn display_date(row: &ReportRow, current_month: bool) -> String {
    match (current_month, row.calendar_date()) {
        (true, Some(date)) => format!("{:02}", date.day()),
        _ => row.date.clone(),
    }
}

fn weekday_label(row: &ReportRow) -> String {
    row.calendar_date()
        .map(|date| date.weekday().to_string())
        .unwrap_or_default()
}
