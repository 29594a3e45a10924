use std::sync::Arc;

use crate::{
    auth, dates, form::html, AuthenticatedSession, Credentials, DateFilter, FormPayload, FormState, PortalFilter,
    Report, ReportQuery, ReportRange, ReportRow, SiteProfile, TimeTrackerError,
};

const REPORT_TABLE_CLASS: &str = "tbl-respuestas";

/// Applies the date filter of the list page and reads back the entries it lists.
#[tracing::instrument(skip(session), fields(username = %session.username))]
pub async fn fetch_report(
    session: &mut AuthenticatedSession,
    query: &ReportQuery,
) -> Result<Report, TimeTrackerError> {
    let site = session.site.clone();
    let range = query.resolve(dates::today());
    session.list_page.require_tokens(&site.tokens.required)?;

    let filter = DateFilter::new(range.start, range.end);
    let payload = FormPayload::new()
        .with_tokens(session.list_page.tokens(), &site.tokens.all)
        .set(site.tokens.event_target.as_str(), site.fields.report_filter_target.as_str())
        .set(site.tokens.event_argument.as_str(), "")
        .set(site.tokens.view_state_encrypted.as_str(), "");
    let payload = filter
        .form_fields(&site.fields)
        .into_iter()
        .fold(payload, |payload, (name, value)| payload.set(name, value));

    let response = session.client.post(&site.list_url(), &payload).await?;
    let report = parse_report(&response.body, range)?;
    tracing::info!(rows = report.rows.len(), total = ?report.total_hours, "Report fetched");

    session.list_page = FormState::from_document(&response.body, &site.tokens.all);
    Ok(report)
}

/// Logs in and fetches one report.
pub async fn show_report(
    site: Arc<SiteProfile>,
    credentials: &Credentials,
    query: &ReportQuery,
) -> Result<Report, TimeTrackerError> {
    let mut session = auth::login(site, credentials).await?;
    fetch_report(&mut session, query).await
}

/// Reads the results table. Its last row holds the portal's total, in the hours column.
pub fn parse_report(document: &str, range: ReportRange) -> Result<Report, TimeTrackerError> {
    let table = html::table_with_class(document, REPORT_TABLE_CLASS).ok_or_else(|| {
        TimeTrackerError::stale_state(format!("report table \"{}\" not found in page", REPORT_TABLE_CLASS))
    })?;

    let mut rows: Vec<Vec<String>> = html::table_rows(table)
        .into_iter()
        .filter(|cells| !cells.is_empty())
        .collect();
    let total_hours = rows.pop().and_then(|total| total.get(1).cloned());

    Ok(Report {
        range,
        rows: rows.iter().filter_map(|cells| ReportRow::from_cells(cells)).collect(),
        total_hours,
    })
}
