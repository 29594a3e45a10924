use std::sync::Arc;

use super::{FormLoaded, TimeEntryWorkflow};
use crate::{
    auth, AuthenticatedSession, Credentials, EntryPlan, EntryRequest, SiteProfile, TimeEntry, TimeTrackerError,
};

/// Logs in and books one entry. The request is checked before the first request goes
/// out.
pub async fn load_entry(
    site: Arc<SiteProfile>,
    credentials: &Credentials,
    request: &EntryRequest,
) -> Result<TimeEntry, TimeTrackerError> {
    let plan = request.plan(&site.absence)?;

    let session = auth::login(site, credentials).await?;
    let form = TimeEntryWorkflow::resume(session, plan.kind).await?;
    let (entry, _) = book(form, &plan).await?;

    Ok(entry)
}

/// Books one entry on a session that is already logged in, handing the session back for
/// the next one. Every call opens a new form.
pub async fn load_entry_with(
    session: AuthenticatedSession,
    request: &EntryRequest,
) -> Result<(TimeEntry, AuthenticatedSession), TimeTrackerError> {
    let plan = request.plan(&session.site.absence)?;

    let form = TimeEntryWorkflow::resume(session, plan.kind).await?;
    book(form, &plan).await
}

async fn book(
    form: TimeEntryWorkflow<FormLoaded>,
    plan: &EntryPlan,
) -> Result<(TimeEntry, AuthenticatedSession), TimeTrackerError> {
    let submitted = form
        .select_project(&plan.project)
        .await?
        .select_category(&plan.category)
        .await?
        .submit(&plan.details)
        .await?;

    Ok(submitted.into_session())
}
