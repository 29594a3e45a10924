use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use timetracker::{dates, load_entry, EntryKind, EntryRequest, SiteProfile, TimeTrackerError};

use super::resolve_hours;
use crate::cli::LoadArgs;
use crate::config::{LoadConfig, LoadOptions};
use crate::output::print_success;

pub async fn run(args: LoadArgs, config_path: &Path) -> Result<()> {
    let config = LoadConfig::load(config_path)?;
    let request = build_request(&args, &config.options, dates::today())?;
    let site = Arc::new(SiteProfile::from_env()?);

    let entry = load_entry(site, &config.credentials.into(), &request).await?;

    print_success(&format!(
        "success! Loaded {} hours on {} to {} / {}",
        entry.hours,
        entry.date_field(),
        entry.project.label(),
        entry.task.label()
    ));
    Ok(())
}

/// Combines the flags with the configured defaults. Leave entries ignore the
/// configured project.
pub fn build_request(args: &LoadArgs, options: &LoadOptions, today: NaiveDate) -> Result<EntryRequest, TimeTrackerError> {
    let kind = EntryKind::from_flags(args.pto, args.vacations)?;
    if !kind.is_leave() && args.text.is_none() {
        return Err(TimeTrackerError::validation(
            "You need to specify what you did with --text (-t)",
        ));
    }

    Ok(EntryRequest {
        kind,
        date: dates::parse_date(&args.date, today)?,
        hours: resolve_hours(args.hours.as_deref(), options.hours.as_ref())?,
        comment: args.text.clone(),
        project: Some(options.project.clone()),
        category: Some(options.task_category.clone()),
        task: Some(options.task_description.clone()),
        focal: Some(options.focal.clone()),
    })
}
