use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use timetracker::{dates, format_report, show_report, FormatOptions, ReportQuery, SiteProfile, TimeTrackerError};

use crate::cli::ShowArgs;
use crate::config::ShowConfig;
use crate::output::print_info;

pub async fn run(args: ShowArgs, config_path: &Path) -> Result<()> {
    let config = ShowConfig::load(config_path)?;
    let query = build_query(&args, dates::today())?;
    let site = Arc::new(SiteProfile::from_env()?);

    let report = show_report(site, &config.credentials.into(), &query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_info(&format!(
        "Start: {}, End: {}",
        dates::format_form_date(report.range.start),
        dates::format_form_date(report.range.end)
    ));
    if report.is_empty() {
        print_info("No hours loaded in this range.");
        return Ok(());
    }

    let table = format_report(
        &report,
        FormatOptions {
            full: args.full,
            weekday: args.weekday,
        },
    );
    print_info(&table.render());
    Ok(())
}

pub fn build_query(args: &ShowArgs, today: NaiveDate) -> Result<ReportQuery, TimeTrackerError> {
    let parse = |text: &Option<String>| {
        text.as_deref()
            .map(|text| dates::parse_date(text, today))
            .transpose()
    };

    Ok(ReportQuery::new(parse(&args.start)?, parse(&args.end)?))
}
