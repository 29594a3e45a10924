//! Small, tag-level scanners for the handful of elements the portal pages are read for.
//!
//! This is not an HTML parser. It understands `<input>`, `<select>`/`<option>` and table
//! rows well enough for the markup the portal's framework emits, and nothing more.

use regex::Regex;
use std::sync::LazyLock;

static INPUT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<input\b([^>]*)>").unwrap());
static SELECT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<select\b([^>]*)>(.*?)</select\s*>").unwrap());
static OPTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<option\b([^>]*)>(.*?)</option\s*>").unwrap());
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .unwrap()
});
static TABLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b([^>]*)>(.*?)</table\s*>").unwrap());
static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());
static TABLE_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Attributes of one start tag, names lowercased, values entity-decoded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn parse(raw: &str) -> Self {
        let pairs = ATTRIBUTE
            .captures_iter(raw)
            .map(|cap| {
                let name = cap[1].to_ascii_lowercase();
                let value = cap
                    .get(2)
                    .or_else(|| cap.get(3))
                    .or_else(|| cap.get(4))
                    .map(|m| decode_entities(m.as_str()))
                    .unwrap_or_default();
                (name, value)
            })
            .collect();

        Self(pairs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Attributes of every `<input>` tag in document order.
pub fn input_tags(document: &str) -> impl Iterator<Item = Attributes> + '_ {
    INPUT_TAG
        .captures_iter(document)
        .map(|cap| Attributes::parse(&cap[1]))
}

/// Every `<select>` element: its attributes and the raw markup between its tags.
pub fn select_blocks(document: &str) -> impl Iterator<Item = (Attributes, &str)> + '_ {
    SELECT_BLOCK.captures_iter(document).filter_map(|cap| {
        let attributes = Attributes::parse(cap.get(1)?.as_str());
        Some((attributes, cap.get(2)?.as_str()))
    })
}

/// `(value attribute, visible text)` of every `<option>` in a fragment. An option
/// without a value attribute submits its text, as a browser would.
pub fn option_tags(fragment: &str) -> impl Iterator<Item = (String, String)> + '_ {
    OPTION_TAG.captures_iter(fragment).map(|cap| {
        let label = text_content(&cap[2]);
        let value = Attributes::parse(&cap[1])
            .get("value")
            .map(str::to_string)
            .unwrap_or_else(|| label.clone());
        (value, label)
    })
}

/// Inner markup of the first `<table>` carrying `class` among its classes.
pub fn table_with_class<'a>(document: &'a str, class: &str) -> Option<&'a str> {
    TABLE_BLOCK.captures_iter(document).find_map(|cap| {
        let attributes = Attributes::parse(cap.get(1)?.as_str());
        let has_class = attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class));
        if has_class {
            cap.get(2).map(|m| m.as_str())
        } else {
            None
        }
    })
}

/// Text of the `<td>` cells of every `<tr>`, in order. Rows made only of `<th>` cells
/// come back empty.
pub fn table_rows(table: &str) -> Vec<Vec<String>> {
    TABLE_ROW
        .captures_iter(table)
        .map(|row| {
            TABLE_CELL
                .captures_iter(&row[1])
                .map(|cell| text_content(&cell[1]))
                .collect()
        })
        .collect()
}

/// Visible text of a fragment: tags removed, entities decoded, whitespace collapsed.
pub fn text_content(fragment: &str) -> String {
    let without_tags = ANY_TAG.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    ENTITY
        .replace_all(s, |cap: &regex::Captures| {
            let entity = &cap[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };

            decoded
                .map(String::from)
                .unwrap_or_else(|| cap[0].to_string())
        })
        .into_owned()
}
