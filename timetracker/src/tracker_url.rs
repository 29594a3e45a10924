use std::env;

use reqwest::Url;

use crate::TimeTrackerError;

pub const DEFAULT_BASE_URL: &str = "https://timetracker.bairesdev.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerUrl(Url);

impl AsRef<str> for TrackerUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for TrackerUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for TrackerUrl {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL must be a valid URL"))
    }
}

impl TrackerUrl {
    pub fn parse(url: &str) -> Result<Self, TimeTrackerError> {
        Url::parse(url)
            .map(Self)
            .map_err(|e| TimeTrackerError::config(format!("invalid time tracker URL {}: {}", url, e)))
    }

    /// Creates a new TrackerUrl from the environment variable `TIMETRACKER_URL`, falling
    /// back to the public portal.
    pub fn from_env() -> Result<Self, TimeTrackerError> {
        match env::var("TIMETRACKER_URL") {
            Ok(url) if !url.trim().is_empty() => Self::parse(url.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.as_str().trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        let joined = format!("{}/{}", trimmed_url, trimmed_path);
        Self(Url::parse(&joined).unwrap_or_else(|_| self.0.clone()))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// `host[:port]` as a browser would send it in the `Host` header.
    pub fn host_header(&self) -> String {
        let host = self.0.host_str().unwrap_or_default();
        match self.0.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Scheme and authority, without a trailing slash.
    pub fn origin(&self) -> String {
        self.0.origin().ascii_serialization()
    }

    /// Whether `other` points at the same page, ignoring query string and fragment.
    pub fn same_page(&self, other: &Url) -> bool {
        self.0.scheme() == other.scheme()
            && self.0.host_str() == other.host_str()
            && self.0.port_or_known_default() == other.port_or_known_default()
            && self.0.path().trim_end_matches('/') == other.path().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_path_avoids_double_slashes() {
        let base = TrackerUrl::parse("https://timetracker.example.com/").unwrap();
        assert_eq!(
            base.append_path("/ListaTimeTracker.aspx").as_ref(),
            "https://timetracker.example.com/ListaTimeTracker.aspx"
        );
    }

    #[test]
    fn host_header_keeps_explicit_port() {
        let base = TrackerUrl::parse("http://127.0.0.1:8123").unwrap();
        assert_eq!(base.host_header(), "127.0.0.1:8123");
        assert_eq!(base.origin(), "http://127.0.0.1:8123");
    }

    #[test]
    fn same_page_ignores_query() {
        let list = TrackerUrl::parse("https://timetracker.example.com/ListaTimeTracker.aspx").unwrap();
        let landed = Url::parse("https://timetracker.example.com/ListaTimeTracker.aspx?ok=1").unwrap();
        let login = Url::parse("https://timetracker.example.com/").unwrap();

        assert!(list.same_page(&landed));
        assert!(!list.same_page(&login));
    }
}
