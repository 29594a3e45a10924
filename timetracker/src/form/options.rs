use serde::Serialize;

use super::html;
use crate::TimeTrackerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// The choices one `<select>` offers, keyed by visible label. Blank placeholder entries
/// are dropped; when two options share a label the first one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionSet(Vec<SelectOption>);

impl OptionSet {
    /// Parses every `<option>` of a markup fragment.
    pub fn from_fragment(fragment: &str) -> Self {
        let mut options: Vec<SelectOption> = Vec::new();
        for (value, label) in html::option_tags(fragment) {
            if label.is_empty() || options.iter().any(|o| o.label == label) {
                continue;
            }
            options.push(SelectOption { label, value });
        }
        Self(options)
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.value.as_str())
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|o| o.label.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Translates a label into the server-side id for `field`. An unknown label is an
    /// error listing every label on offer.
    pub fn resolve(&self, field: &str, label: &str) -> Result<Selection, TimeTrackerError> {
        match self.get(label) {
            Some(id) => Ok(Selection {
                field: field.to_string(),
                label: label.to_string(),
                id: id.to_string(),
            }),
            None => Err(TimeTrackerError::OptionNotFound {
                field: field.to_string(),
                requested: label.to_string(),
                available: self.labels(),
            }),
        }
    }
}

/// A label matched against the options of the current page, and the id it maps to.
/// Only [`OptionSet::resolve`] creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    field: String,
    label: String,
    id: String,
}

impl Selection {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// One `<select>` found in a page, addressable by its `name` or its `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectElement {
    pub name: Option<String>,
    pub id: Option<String>,
    pub options: OptionSet,
}

impl SelectElement {
    /// Matches either attribute. The framework derives ids from names by replacing `$`
    /// with `_`, so a key in one form also finds an element only carrying the other.
    pub fn matches(&self, key: &str) -> bool {
        let as_id = key.replace('$', "_");
        self.name.as_deref() == Some(key)
            || self.id.as_deref() == Some(key)
            || self.id.as_deref() == Some(as_id.as_str())
            || self.name.as_deref().map(|n| n.replace('$', "_")).as_deref() == Some(key)
    }
}

pub fn select_elements(document: &str) -> Vec<SelectElement> {
    html::select_blocks(document)
        .map(|(attrs, inner)| SelectElement {
            name: attrs.get("name").map(str::to_string),
            id: attrs.get("id").map(str::to_string),
            options: OptionSet::from_fragment(inner),
        })
        .collect()
}

/// Options of the `<select>` identified by `key` (name or id).
pub fn extract_options(document: &str, key: &str) -> Result<OptionSet, TimeTrackerError> {
    select_elements(document)
        .into_iter()
        .find(|select| select.matches(key))
        .map(|select| select.options)
        .ok_or_else(|| TimeTrackerError::stale_state(format!("select \"{}\" not found in page", key)))
}

/// Options following the first mention of `field` in a raw fragment, up to the next
/// `</select>`. Used on partial updates, whose panels are not guaranteed to hold
/// complete elements. Returns `None` when `field` is not mentioned at all.
pub fn options_after(fragment: &str, field: &str) -> Option<OptionSet> {
    let as_id = field.replace('$', "_");
    let start = fragment.find(field).or_else(|| fragment.find(&as_id))?;
    let tail = &fragment[start..];
    let end = tail.find("</select>").unwrap_or(tail.len());
    Some(OptionSet::from_fragment(&tail[..end]))
}
