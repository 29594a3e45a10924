use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use timetracker::{dates, load_entry_with, login, AbsenceLabels, EntryKind, EntryRequest, SiteProfile, TimeTrackerError};

use super::resolve_hours;
use crate::cli::BatchArgs;
use crate::config::{LoadConfig, LoadOptions};
use crate::output::{print_info, print_success};

/// One CSV row. Empty cells fall back to the configured options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchRow {
    pub date: Option<String>,
    pub hours: Option<String>,
    pub text: Option<String>,
    pub kind: Option<String>,
    pub project: Option<String>,
    pub category: Option<String>,
    pub task: Option<String>,
    pub focal: Option<String>,
}

impl BatchRow {
    pub fn to_request(&self, options: &LoadOptions, today: NaiveDate) -> Result<EntryRequest, TimeTrackerError> {
        let date = non_empty(&self.date)
            .ok_or_else(|| TimeTrackerError::validation("no date given"))?;
        let kind: EntryKind = non_empty(&self.kind).unwrap_or_default().parse()?;

        Ok(EntryRequest {
            kind,
            date: dates::parse_date(date, today)?,
            hours: resolve_hours(non_empty(&self.hours), options.hours.as_ref())?,
            comment: non_empty(&self.text).map(str::to_string),
            project: Some(or_default(&self.project, &options.project)),
            category: Some(or_default(&self.category, &options.task_category)),
            task: Some(or_default(&self.task, &options.task_description)),
            focal: Some(or_default(&self.focal, &options.focal)),
        })
    }
}

pub async fn run(args: BatchArgs, config_path: &Path) -> Result<()> {
    let config = LoadConfig::load(config_path)?;
    let file = File::open(&args.file).with_context(|| format!("Failed to open {}", args.file.display()))?;
    let site = Arc::new(SiteProfile::from_env()?);

    let requests = read_requests(file, &config.options, &site.absence, dates::today())?;
    if args.dry_run {
        for request in &requests {
            print_info(&format!(
                "{} {} hours {}",
                dates::format_form_date(request.date),
                request.hours,
                request.comment.as_deref().unwrap_or("")
            ));
        }
        print_success(&format!("{} rows are valid", requests.len()));
        return Ok(());
    }

    let mut session = login(site, &config.credentials.into()).await?;
    for (index, request) in requests.iter().enumerate() {
        let (entry, next) = load_entry_with(session, request)
            .await
            .with_context(|| format!("row {} ({}) could not be loaded", index + 1, dates::format_form_date(request.date)))?;
        session = next;

        print_success(&format!(
            "Loaded {} hours on {} to {} / {}",
            entry.hours,
            entry.date_field(),
            entry.project.label(),
            entry.task.label()
        ));
    }

    Ok(())
}

/// Reads every row and checks it can be booked, so a bad row stops the batch before
/// anything is loaded.
pub fn read_requests<R: Read>(
    reader: R,
    options: &LoadOptions,
    absence: &AbsenceLabels,
    today: NaiveDate,
) -> Result<Vec<EntryRequest>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    reader
        .deserialize::<BatchRow>()
        .enumerate()
        .map(|(index, row)| {
            let checked = || -> Result<EntryRequest> {
                let request = row?.to_request(options, today)?;
                request.plan(absence)?;
                Ok(request)
            };
            checked().with_context(|| format!("row {} is invalid", index + 1))
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn or_default(value: &Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or(default).to_string()
}
