mod hidden_fields;
pub(crate) mod html;
mod options;
pub(crate) mod partial;

pub use hidden_fields::*;
pub use options::*;
pub use partial::{DeltaRecord, PartialUpdate};

use serde::Serialize;

use crate::TimeTrackerError;

/// What one response told us: its hidden state tokens and the dropdowns it offered.
///
/// A `FormState` is never edited. Every step parses a new one from its own response and
/// drops the previous one, since the server refuses tokens that were already used.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    tokens: Tokens,
    selects: Vec<SelectElement>,
}

impl FormState {
    pub fn from_document(document: &str, token_names: &[String]) -> Self {
        Self {
            tokens: Tokens::from_document(document, token_names),
            selects: select_elements(document),
        }
    }

    /// State after an asynchronous postback. `dependent_fields` are the dropdowns the
    /// postback is expected to re-render; they are picked out of the raw panel markup.
    pub fn from_partial(update: &PartialUpdate, token_names: &[String], dependent_fields: &[&str]) -> Self {
        let markup = update.markup();
        let selects = dependent_fields
            .iter()
            .filter_map(|field| {
                options_after(&markup, field).map(|options| SelectElement {
                    name: Some(field.to_string()),
                    id: None,
                    options,
                })
            })
            .collect();

        Self {
            tokens: Tokens::from_partial(update, token_names),
            selects,
        }
    }

    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    pub fn token(&self, name: &str) -> Option<&str> {
        self.tokens.get(name)
    }

    pub fn has_select(&self, key: &str) -> bool {
        self.selects.iter().any(|s| s.matches(key))
    }

    /// Options of the dropdown `key`; a missing dropdown means the page is not the one
    /// the caller expected.
    pub fn options(&self, key: &str) -> Result<&OptionSet, TimeTrackerError> {
        self.selects
            .iter()
            .find(|s| s.matches(key))
            .map(|s| &s.options)
            .ok_or_else(|| TimeTrackerError::stale_state(format!("select \"{}\" not found in page", key)))
    }

    /// Fails when any of `required` was not part of the response.
    pub fn require_tokens(&self, required: &[String]) -> Result<(), TimeTrackerError> {
        match required.iter().find(|name| self.tokens.get(name).is_none()) {
            Some(missing) => Err(TimeTrackerError::stale_state(format!(
                "hidden field \"{}\" missing from response",
                missing
            ))),
            None => Ok(()),
        }
    }
}

/// Ordered `application/x-www-form-urlencoded` body. Setting a field twice keeps its
/// first position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormPayload(Vec<(String, String)>);

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.0.push((name, value)),
        }
        self
    }

    /// Adds every name in `names`, taking values from `tokens` and sending an empty
    /// value for the ones the last response did not carry.
    pub fn with_tokens(self, tokens: &Tokens, names: &[String]) -> Self {
        names.iter().fold(self, |payload, name| {
            let value = tokens.get(name).unwrap_or_default().to_string();
            payload.set(name.as_str(), value)
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}
