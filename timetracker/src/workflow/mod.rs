//! The add-entry form as a chain of states: log in, open the form, pick a project,
//! pick a category, submit. Each transition consumes the previous state, so tokens
//! captured before a postback can never be sent again.

mod load_entry;

pub use load_entry::*;

use std::sync::Arc;

use crate::{
    auth, dates, AuthenticatedSession, Credentials, EntryDetails, EntryKind, FormPayload, FormState,
    OptionSet, PartialUpdate, Selection, SessionClient, SiteProfile, TimeEntry, TimeTrackerError,
};

#[derive(Debug)]
pub struct TimeEntryWorkflow<S> {
    site: Arc<SiteProfile>,
    client: SessionClient,
    username: String,
    kind: EntryKind,
    state: S,
}

#[derive(Debug)]
pub struct LoggedOut;

#[derive(Debug)]
pub struct FormLoaded {
    form: FormState,
}

#[derive(Debug)]
pub struct ProjectSelected {
    form: FormState,
    project: Selection,
    categories: OptionSet,
}

#[derive(Debug)]
pub struct CategorySelected {
    form: FormState,
    project: Selection,
    category: Selection,
}

#[derive(Debug)]
pub struct Submitted {
    entry: TimeEntry,
    list_page: FormState,
}

impl<S> TimeEntryWorkflow<S> {
    fn into_state<T>(self, state: T) -> TimeEntryWorkflow<T> {
        TimeEntryWorkflow {
            site: self.site,
            client: self.client,
            username: self.username,
            kind: self.kind,
            state,
        }
    }

    /// Empty values for the dropdowns and text boxes below the one being changed. Leave
    /// entries never send the focal point field.
    fn placeholders(&self, fields: &[&str]) -> Vec<String> {
        fields
            .iter()
            .filter(|field| self.kind.requires_focal() || **field != self.site.fields.focal)
            .map(|field| field.to_string())
            .collect()
    }

    /// Asynchronous postback fired when the dropdown `trigger` changes.
    async fn post_partial(
        &self,
        trigger: &str,
        current: &FormState,
        values: FormPayload,
        dependent_fields: &[&str],
    ) -> Result<FormState, TimeTrackerError> {
        let fields = &self.site.fields;
        let payload = FormPayload::new()
            .set(fields.script_manager.as_str(), fields.partial_trigger(trigger))
            .set(fields.date.as_str(), dates::format_form_date(dates::today()));
        let payload = values
            .pairs()
            .iter()
            .fold(payload, |payload, (name, value)| payload.set(name.as_str(), value.as_str()))
            .with_tokens(current.tokens(), &self.site.tokens.all)
            .set(fields.async_post.as_str(), "true");

        let response = self.client.post(&self.site.entry_form_url(), &payload).await?;
        let update = PartialUpdate::parse(&response.body);

        if let Some(message) = update.server_error() {
            return Err(TimeTrackerError::stale_state(format!(
                "portal rejected the change of {}: {}",
                trigger, message
            )));
        }
        if let Some(target) = update.page_redirect() {
            return Err(TimeTrackerError::stale_state(format!(
                "portal redirected to {} instead of updating the form",
                target
            )));
        }
        if !update.is_well_formed() {
            tracing::debug!(trigger, "Partial update is malformed, scanning raw payload");
        }

        let next = FormState::from_partial(&update, &self.site.tokens.all, dependent_fields);
        next.require_tokens(&self.site.tokens.required)?;
        Ok(next)
    }
}

impl TimeEntryWorkflow<LoggedOut> {
    pub fn new(site: Arc<SiteProfile>, kind: EntryKind) -> Result<Self, TimeTrackerError> {
        let client = SessionClient::new(&site)?;
        Ok(Self {
            site,
            client,
            username: String::new(),
            kind,
            state: LoggedOut,
        })
    }

    /// Logs in and opens an empty entry form.
    pub async fn login(self, credentials: &Credentials) -> Result<TimeEntryWorkflow<FormLoaded>, TimeTrackerError> {
        let session = auth::sign_in(self.client, self.site, credentials).await?;
        TimeEntryWorkflow::resume(session, self.kind).await
    }
}

impl TimeEntryWorkflow<FormLoaded> {
    /// Opens a fresh entry form on an existing session.
    pub async fn resume(session: AuthenticatedSession, kind: EntryKind) -> Result<Self, TimeTrackerError> {
        let form = open_form(&session.client, &session.site).await?;
        Ok(Self {
            site: session.site,
            client: session.client,
            username: session.username,
            kind,
            state: FormLoaded { form },
        })
    }

    pub fn projects(&self) -> Result<&OptionSet, TimeTrackerError> {
        self.state.form.options(&self.site.fields.project)
    }

    /// Picks a project and asks the portal for the categories it allows. An unknown
    /// project fails before anything is posted.
    #[tracing::instrument(skip(self))]
    pub async fn select_project(self, label: &str) -> Result<TimeEntryWorkflow<ProjectSelected>, TimeTrackerError> {
        let fields = &self.site.fields;
        let project = self.projects()?.resolve("project", label)?;

        let values = self
            .placeholders(&[
                fields.hours.as_str(),
                fields.category.as_str(),
                fields.task.as_str(),
                fields.comment.as_str(),
                fields.focal.as_str(),
            ])
            .into_iter()
            .fold(FormPayload::new().set(fields.project.as_str(), project.id()), |payload, field| {
                payload.set(field, "")
            });

        let next = self
            .post_partial(&fields.project, &self.state.form, values, &[fields.category.as_str()])
            .await?;

        let categories = match next.options(&fields.category) {
            Ok(options) => options.clone(),
            Err(_) => {
                tracing::debug!("Category list not part of the update, using the loaded form");
                self.state.form.options(&fields.category)?.clone()
            }
        };
        tracing::info!(project = project.label(), categories = categories.len(), "Project selected");

        Ok(self.into_state(ProjectSelected {
            form: next,
            project,
            categories,
        }))
    }
}

impl TimeEntryWorkflow<ProjectSelected> {
    pub fn project(&self) -> &Selection {
        &self.state.project
    }

    pub fn categories(&self) -> &OptionSet {
        &self.state.categories
    }

    /// Picks a task category; the answer carries the task and focal point lists.
    #[tracing::instrument(skip(self))]
    pub async fn select_category(self, label: &str) -> Result<TimeEntryWorkflow<CategorySelected>, TimeTrackerError> {
        let fields = &self.site.fields;
        let category = self.state.categories.resolve("category", label)?;

        let values = self
            .placeholders(&[
                fields.hours.as_str(),
                fields.task.as_str(),
                fields.comment.as_str(),
                fields.focal.as_str(),
            ])
            .into_iter()
            .fold(
                FormPayload::new()
                    .set(fields.project.as_str(), self.state.project.id())
                    .set(fields.category.as_str(), category.id()),
                |payload, field| payload.set(field, ""),
            );

        let dependent = if self.kind.requires_focal() {
            vec![fields.task.as_str(), fields.focal.as_str()]
        } else {
            vec![fields.task.as_str()]
        };
        let next = self
            .post_partial(&fields.category, &self.state.form, values, &dependent)
            .await?;
        tracing::info!(category = category.label(), "Category selected");

        let project = self.state.project.clone();
        Ok(self.into_state(CategorySelected {
            form: next,
            project,
            category,
        }))
    }
}

impl TimeEntryWorkflow<CategorySelected> {
    pub fn project(&self) -> &Selection {
        &self.state.project
    }

    pub fn category(&self) -> &Selection {
        &self.state.category
    }

    pub fn tasks(&self) -> Result<&OptionSet, TimeTrackerError> {
        self.state.form.options(&self.site.fields.task)
    }

    pub fn focals(&self) -> Result<&OptionSet, TimeTrackerError> {
        self.state.form.options(&self.site.fields.focal)
    }

    /// Resolves the remaining labels and posts the entry. The portal accepts an entry
    /// only by redirecting back to the list page.
    #[tracing::instrument(skip(self, details), fields(date = %details.date, hours = %details.hours))]
    pub async fn submit(self, details: &EntryDetails) -> Result<TimeEntryWorkflow<Submitted>, TimeTrackerError> {
        let fields = &self.site.fields;
        let task = self.tasks()?.resolve("task", &details.task)?;

        let focal = if self.kind.requires_focal() {
            let label = details
                .focal
                .as_deref()
                .ok_or_else(|| TimeTrackerError::validation("a focal point is required for work entries"))?;
            Some(self.focals()?.resolve("focal", label)?)
        } else {
            None
        };

        let comment = details.comment.trim();
        if comment.is_empty() && !self.kind.is_leave() {
            return Err(TimeTrackerError::validation("a description of what you did is required"));
        }

        let entry = TimeEntry {
            date: details.date,
            project: self.state.project.clone(),
            category: self.state.category.clone(),
            task,
            hours: details.hours,
            comment: comment.to_string(),
            focal,
        };

        let mut payload = FormPayload::new()
            .set(fields.date.as_str(), entry.date_field())
            .set(fields.project.as_str(), entry.project.id())
            .set(fields.category.as_str(), entry.category.id())
            .set(fields.task.as_str(), entry.task.id())
            .set(fields.hours.as_str(), entry.hours.as_form_value())
            .set(fields.comment.as_str(), entry.comment.as_str());
        if let Some(focal) = &entry.focal {
            payload = payload.set(fields.focal.as_str(), focal.id());
        }
        let payload = payload
            .set(fields.submit_button.as_str(), fields.submit_button_value.as_str())
            .with_tokens(self.state.form.tokens(), &self.site.tokens.all);

        let response = self.client.post(&self.site.entry_form_url(), &payload).await?;
        if !response.redirected_to(&self.site.list_url()) {
            tracing::debug!(status = %response.status, url = %response.url, "Entry not accepted");
            return Err(TimeTrackerError::Submission(
                "There was a problem loading your timetracker :(".to_string(),
            ));
        }
        tracing::info!(project = entry.project.label(), task = entry.task.label(), "Entry submitted");

        let list_page = FormState::from_document(&response.body, &self.site.tokens.all);
        Ok(self.into_state(Submitted { entry, list_page }))
    }
}

impl TimeEntryWorkflow<Submitted> {
    pub fn entry(&self) -> &TimeEntry {
        &self.state.entry
    }

    /// Hands the session back, e.g. to book the next entry.
    pub fn into_session(self) -> (TimeEntry, AuthenticatedSession) {
        let session = AuthenticatedSession {
            client: self.client,
            site: self.site,
            list_page: self.state.list_page,
            username: self.username,
        };
        (self.state.entry, session)
    }
}

async fn open_form(client: &SessionClient, site: &SiteProfile) -> Result<FormState, TimeTrackerError> {
    let page = client.get(&site.entry_form_url()).await?;
    let form = FormState::from_document(&page.body, &site.tokens.all);
    form.require_tokens(&site.tokens.required)?;
    tracing::info!("Entry form loaded");
    Ok(form)
}
