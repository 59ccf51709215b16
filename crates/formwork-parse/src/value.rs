//! The typed structured form value.
//!
//! [`FormValue`] is what a successful parse produces: the payload's leaves
//! coerced to their schema-declared types and arranged into the schema's
//! shape. It serializes naturally (records as objects, lists as arrays)
//! and can be flattened back into payload entries, which is the inverse of
//! parsing and is also how default values are rendered into a form.

use std::collections::BTreeMap;

use serde::Serialize;

/// A typed, structured form value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// An explicitly absent value (optional array element placeholder).
    Null,
    /// A coerced checkbox value.
    Bool(bool),
    /// A coerced numeric value.
    Number(f64),
    /// A text or email value.
    Text(String),
    /// An ordered sequence.
    List(Vec<FormValue>),
    /// A named mapping, ordered by field name.
    Record(BTreeMap<String, FormValue>),
}

impl FormValue {
    /// Returns the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a number.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a bool.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the named field of a record, if present.
    pub fn get(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Flattens this value into `(path, raw string)` payload entries.
    ///
    /// `Null` and `false` checkboxes produce no entry (an unticked box
    /// submits nothing); numbers render without a trailing `.0` when they
    /// are whole. Reparsing the result against the same schema yields an
    /// equal value.
    pub fn to_payload_entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        self.flatten("", &mut entries);
        entries
    }

    fn flatten(&self, path: &str, entries: &mut Vec<(String, String)>) {
        match self {
            Self::Null | Self::Bool(false) => {}
            Self::Bool(true) => entries.push((path.to_string(), "on".to_string())),
            Self::Number(n) => entries.push((path.to_string(), format_number(*n))),
            Self::Text(s) => entries.push((path.to_string(), s.clone())),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.flatten(&format!("{path}[{i}]"), entries);
                }
            }
            Self::Record(fields) => {
                for (name, value) in fields {
                    let child = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    value.flatten(&child, entries);
                }
            }
        }
    }
}

/// Formats a number the way a form input would submit it.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
