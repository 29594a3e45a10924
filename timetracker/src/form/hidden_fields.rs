use super::{html, PartialUpdate};

/// Hidden state fields captured from one response, in the order they were asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens(Vec<(String, String)>);

impl Tokens {
    /// Reads `names` from a full HTML page.
    pub fn from_document(document: &str, names: &[String]) -> Self {
        Self::collect(names, |name| hidden_value(document, name))
    }

    /// Reads `names` from a partial update. Fields the payload omits are left out, never
    /// carried over from an earlier response.
    pub fn from_partial(update: &PartialUpdate, names: &[String]) -> Self {
        Self::collect(names, |name| update.hidden_field(name))
    }

    fn collect(names: &[String], lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self(
            names
                .iter()
                .filter_map(|name| lookup(name).map(|value| (name.clone(), value)))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Value of the `<input>` named `name`. An input without a value attribute yields an
/// empty string; a missing input yields `None`.
pub fn hidden_value(document: &str, name: &str) -> Option<String> {
    html::input_tags(document)
        .find(|attrs| attrs.get("name") == Some(name))
        .map(|attrs| attrs.get("value").unwrap_or_default().to_string())
}
