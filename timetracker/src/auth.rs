use std::sync::Arc;

use crate::{FormPayload, FormState, SessionClient, SiteProfile, TimeTrackerError};

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A logged in session, together with the list page the login landed on.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub client: SessionClient,
    pub site: Arc<SiteProfile>,
    /// Tokens and dropdowns of the last list page seen. The report filter posts back
    /// against it.
    pub list_page: FormState,
    pub username: String,
}

/// Opens a new session and logs in.
pub async fn login(
    site: Arc<SiteProfile>,
    credentials: &Credentials,
) -> Result<AuthenticatedSession, TimeTrackerError> {
    let client = SessionClient::new(&site)?;
    sign_in(client, site, credentials).await
}

/// Logs `client` in: loads the login page for its tokens, then posts the credentials.
#[tracing::instrument(skip(client, site, credentials), fields(username = %credentials.username))]
pub(crate) async fn sign_in(
    client: SessionClient,
    site: Arc<SiteProfile>,
    credentials: &Credentials,
) -> Result<AuthenticatedSession, TimeTrackerError> {
    let login_page = client.get(&site.login_url()).await?;
    let login_form = FormState::from_document(&login_page.body, &site.tokens.all);
    login_form.require_tokens(&site.tokens.required)?;

    let list_page = authenticate(&client, &site, credentials, &login_form).await?;
    tracing::info!("Logged in");

    Ok(AuthenticatedSession {
        client,
        site,
        list_page,
        username: credentials.username.clone(),
    })
}

/// Posts the login form. The portal only signals a good login by redirecting to the
/// list page; anything else means the credentials were refused.
pub async fn authenticate(
    client: &SessionClient,
    site: &SiteProfile,
    credentials: &Credentials,
    login_page: &FormState,
) -> Result<FormState, TimeTrackerError> {
    let fields = &site.fields;
    let payload = FormPayload::new()
        .set(fields.username.as_str(), credentials.username.as_str())
        .set(fields.password.as_str(), credentials.password.as_str())
        .set(fields.login_button.as_str(), fields.login_button_value.as_str())
        .with_tokens(login_page.tokens(), &site.tokens.all);

    let response = client.post(&site.login_url(), &payload).await?;

    if !response.redirected_to(&site.list_url()) {
        tracing::debug!(status = %response.status, url = %response.url, hops = response.history.len(), "Login refused");
        return Err(TimeTrackerError::Authentication(
            "There was a problem login with your credentials. \
             Please check them in the config file and try again."
                .to_string(),
        ));
    }

    Ok(FormState::from_document(&response.body, &site.tokens.all))
}
