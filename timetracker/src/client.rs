use std::sync::Arc;

use reqwest::{
    cookie::Jar,
    header::{HeaderMap, HeaderName, HeaderValue, HOST, LOCATION, ORIGIN, REFERER, USER_AGENT},
    redirect, Client, Method, StatusCode, Url,
};

use crate::{
    error::TransportErrorKind, FormPayload, SiteProfile, TimeTrackerError, TrackerUrl,
};

const MAX_REDIRECTS: usize = 10;

/// Cookie-keeping HTTP session against the portal.
///
/// Redirects are followed here rather than by reqwest so every hop can be reported back;
/// the portal signals success and failure only through where it redirects to. Requests
/// are never retried.
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    pub status: StatusCode,
    pub url: Url,
}

/// A response after all redirects were followed.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: StatusCode,
    /// URL of the last request, after redirects.
    pub url: Url,
    /// One entry per redirect response, in the order they were received.
    pub history: Vec<RedirectHop>,
    pub body: String,
}

impl PageResponse {
    /// True when the server answered with a `302` first and finally rendered `page`
    /// with a `200`. This is how the portal acknowledges both a login and a submitted
    /// entry.
    pub fn redirected_to(&self, page: &TrackerUrl) -> bool {
        self.history
            .first()
            .is_some_and(|hop| hop.status == StatusCode::FOUND)
            && self.status == StatusCode::OK
            && page.same_page(&self.url)
    }
}

impl SessionClient {
    pub fn new(site: &SiteProfile) -> Result<Self, TimeTrackerError> {
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(HOST, header_value(&site.headers.host)?);
        headers.insert(USER_AGENT, header_value(&site.headers.user_agent)?);
        headers.insert(ORIGIN, header_value(&site.headers.origin)?);
        headers.insert(REFERER, header_value(&site.headers.referer)?);
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );

        let client = Client::builder()
            .cookie_provider(jar)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .timeout(site.request_timeout)
            .build()
            .map_err(|e| TimeTrackerError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub async fn get(&self, url: &TrackerUrl) -> Result<PageResponse, TimeTrackerError> {
        self.execute(Method::GET, url.url().clone(), None).await
    }

    pub async fn post(&self, url: &TrackerUrl, form: &FormPayload) -> Result<PageResponse, TimeTrackerError> {
        self.execute(Method::POST, url.url().clone(), Some(form)).await
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        form: Option<&FormPayload>,
    ) -> Result<PageResponse, TimeTrackerError> {
        let mut method = method;
        let mut url = url;
        let mut form = form;
        let mut history = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(form) = form {
                request = request.form(form.pairs());
            }

            let response = request
                .send()
                .await
                .map_err(|e| TimeTrackerError::transport(url.as_str(), e))?;
            let status = response.status();
            tracing::debug!(%method, %url, %status, "Portal responded");

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            if let (true, Some(location)) = (status.is_redirection(), location) {
                let next = url.join(&location).map_err(|e| TimeTrackerError::Transport {
                    url: url.to_string(),
                    kind: TransportErrorKind::Other(format!("invalid redirect target {}: {}", location, e)),
                })?;

                history.push(RedirectHop {
                    status,
                    url: url.clone(),
                });
                if !matches!(status, StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT) {
                    method = Method::GET;
                    form = None;
                }
                url = next;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                return Err(TimeTrackerError::Transport {
                    url: url.to_string(),
                    kind: TransportErrorKind::Status(status),
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| TimeTrackerError::transport(url.as_str(), e))?;

            return Ok(PageResponse {
                status,
                url,
                history,
                body,
            });
        }

        Err(TimeTrackerError::Transport {
            url: url.to_string(),
            kind: TransportErrorKind::TooManyRedirects,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TimeTrackerError> {
    HeaderValue::from_str(value)
        .map_err(|e| TimeTrackerError::config(format!("Invalid header value {:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(history: Vec<(u16, &str)>, status: u16, url: &str) -> PageResponse {
        PageResponse {
            status: StatusCode::from_u16(status).unwrap(),
            url: Url::parse(url).unwrap(),
            history: history
                .into_iter()
                .map(|(status, url)| RedirectHop {
                    status: StatusCode::from_u16(status).unwrap(),
                    url: Url::parse(url).unwrap(),
                })
                .collect(),
            body: String::new(),
        }
    }

    #[test]
    fn redirect_chain_must_start_with_found_and_land_on_page() {
        let list = TrackerUrl::parse("https://tt.example.com/ListaTimeTracker.aspx").unwrap();

        let success = response(vec![(302, "https://tt.example.com/")], 200, "https://tt.example.com/ListaTimeTracker.aspx");
        let no_redirect = response(vec![], 200, "https://tt.example.com/ListaTimeTracker.aspx");
        let wrong_page = response(vec![(302, "https://tt.example.com/")], 200, "https://tt.example.com/Error.aspx");
        let see_other = response(vec![(303, "https://tt.example.com/")], 200, "https://tt.example.com/ListaTimeTracker.aspx");

        assert!(success.redirected_to(&list));
        assert!(!no_redirect.redirected_to(&list));
        assert!(!wrong_page.redirected_to(&list));
        assert!(!see_other.redirected_to(&list));
    }

    #[test]
    fn client_builds_from_default_profile() {
        assert!(SessionClient::new(&SiteProfile::default()).is_ok());
    }
}
