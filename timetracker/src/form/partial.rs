//! Reader for the delta payload the portal returns to an asynchronous postback.
//!
//! The payload is a flat sequence of `length|type|id|content|` records, where `length`
//! counts the characters of `content`. Hidden fields travel as
//! `length|hiddenField|NAME|value|` and re-rendered panels as
//! `length|updatePanel|ID|markup|`.

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaRecord {
    pub kind: String,
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PartialUpdate {
    raw: String,
    records: Option<Vec<DeltaRecord>>,
}

impl PartialUpdate {
    pub fn parse(raw: &str) -> Self {
        let records = parse_records(raw);
        if records.is_none() {
            tracing::debug!("Partial update payload is not length-consistent, falling back to pattern scan");
        }

        Self {
            raw: raw.to_string(),
            records,
        }
    }

    /// Whether the payload could be read record by record.
    pub fn is_well_formed(&self) -> bool {
        self.records.is_some()
    }

    pub fn records(&self) -> &[DeltaRecord] {
        self.records.as_deref().unwrap_or_default()
    }

    /// Value of hidden field `name`, or `None` when the payload does not carry it.
    pub fn hidden_field(&self, name: &str) -> Option<String> {
        match &self.records {
            Some(records) => records
                .iter()
                .find(|r| r.kind == "hiddenField" && r.id == name)
                .map(|r| r.content.clone()),
            None => scan_hidden_field(&self.raw, name),
        }
    }

    /// Markup of every re-rendered panel, or the whole payload when it could not be split.
    pub fn markup(&self) -> String {
        match &self.records {
            Some(records) => records
                .iter()
                .filter(|r| r.kind == "updatePanel")
                .map(|r| r.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            None => self.raw.clone(),
        }
    }

    /// Message of an `error` record, emitted when the server rejected the postback.
    pub fn server_error(&self) -> Option<String> {
        self.records()
            .iter()
            .find(|r| r.kind == "error")
            .map(|r| format!("{} {}", r.id, r.content).trim().to_string())
    }

    /// Target of a `pageRedirect` record, emitted instead of a panel when the session
    /// is gone.
    pub fn page_redirect(&self) -> Option<&str> {
        self.records()
            .iter()
            .find(|r| r.kind == "pageRedirect")
            .map(|r| r.content.as_str())
    }
}

fn parse_records(raw: &str) -> Option<Vec<DeltaRecord>> {
    let mut records = Vec::new();
    let mut rest = raw;

    while !rest.trim().is_empty() {
        let (length, after_length) = rest.split_once('|')?;
        let length: usize = length.trim().parse().ok()?;
        let (kind, after_kind) = after_length.split_once('|')?;
        let (id, after_id) = after_kind.split_once('|')?;

        let content_end = if length == 0 {
            0
        } else {
            match after_id.char_indices().nth(length) {
                Some((end, _)) => end,
                None if after_id.chars().count() == length => after_id.len(),
                None => return None,
            }
        };
        let (content, after_content) = after_id.split_at(content_end);
        rest = after_content.strip_prefix('|')?;

        records.push(DeltaRecord {
            kind: kind.to_string(),
            id: id.to_string(),
            content: content.to_string(),
        });
    }

    Some(records)
}

fn scan_hidden_field(raw: &str, name: &str) -> Option<String> {
    let pattern = format!(r"hiddenField\|{}\|([^|]*)", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(raw).map(|cap| cap[1].to_string())
}

#[cfg(test)]
pub(crate) fn encode(records: &[(&str, &str, &str)]) -> String {
    records
        .iter()
        .map(|(kind, id, content)| format!("{}|{}|{}|{}|", content.chars().count(), kind, id, content))
        .collect()
}
