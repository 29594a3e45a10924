use reqwest::StatusCode;
use thiserror::Error;

/// Every way a time tracker command can fail.
///
/// Each variant carries enough context to be shown to the user as is. Nothing in this
/// crate retries after one of these, since repeating a submit could book the same
/// hours twice.
#[derive(Error, Debug)]
pub enum TimeTrackerError {
    #[error("{0}")]
    Config(String),
    #[error("request to {url} failed: {kind}")]
    Transport { url: String, kind: TransportErrorKind },
    #[error("{0}")]
    Authentication(String),
    #[error("{} \"{requested}\" is not available. Choose from: {}", capitalize(.field), quoted(.available))]
    OptionNotFound {
        field: String,
        requested: String,
        available: Vec<String>,
    },
    #[error("unexpected page state: {0}")]
    StaleState(String),
    #[error("{0}")]
    Submission(String),
    #[error("{0}")]
    Validation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    #[error("timed out")]
    Timeout,
    #[error("connection failed ({0})")]
    Connect(String),
    #[error("server answered {0}")]
    Status(StatusCode),
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("{0}")]
    Other(String),
}

impl TimeTrackerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn stale_state(msg: impl Into<String>) -> Self {
        Self::StaleState(msg.into())
    }

    pub(crate) fn transport(url: impl Into<String>, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            TransportErrorKind::Status(status)
        } else {
            TransportErrorKind::Other(err.to_string())
        };

        Self::Transport {
            url: url.into(),
            kind,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn quoted(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("\"{}\"", label))
        .collect::<Vec<_>>()
        .join(", ")
}
