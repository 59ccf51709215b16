//! The raw form payload.
//!
//! [`FormData`] holds the as-submitted key/value pairs of a form post. It is
//! a multi-value structure — the same key may appear any number of times —
//! and unlike a plain multimap it preserves the submission order of every
//! entry, because entry order defines array order when a payload is decoded
//! into nested structures.

use crate::error::{FormworkError, FormworkResult};

/// An ordered, immutable-by-default dictionary for urlencoded form data.
///
/// `FormData` is immutable once parsed; [`copy`](FormData::copy) returns a
/// mutable clone for the rare cases (tests, payload synthesis) that need to
/// build one up incrementally.
///
/// # Examples
///
/// ```
/// use formwork_core::FormData;
///
/// let data = FormData::parse("color=red&color=blue&size=large");
/// assert_eq!(data.get("color"), Some("blue"));
/// assert_eq!(data.get_list("color"), vec!["red", "blue"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormData {
    entries: Vec<(String, String)>,
    mutable: bool,
}

impl FormData {
    /// Creates a new, empty, immutable `FormData`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            mutable: false,
        }
    }

    /// Creates a new, empty, mutable `FormData`.
    pub const fn new_mutable() -> Self {
        Self {
            entries: Vec::new(),
            mutable: true,
        }
    }

    /// Parses a urlencoded body (e.g. `"email=a%40b.com&message=hi"`) into
    /// an immutable `FormData`.
    ///
    /// Handles percent-encoding, `+` as space, and empty pairs.
    pub fn parse(body: &str) -> Self {
        let mut entries = Vec::new();

        for pair in body.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq| (&pair[..eq], &pair[eq + 1..]));
            entries.push((percent_decode(key), percent_decode(value)));
        }

        Self {
            entries,
            mutable: false,
        }
    }

    /// Creates an immutable `FormData` from pre-decoded pairs, preserving
    /// their order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            mutable: false,
        }
    }

    /// Returns the **last** value submitted for the given key, or `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all values submitted for the given key, in submission order.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Iterates over every `(key, value)` entry in submission order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets a single value for the given key, replacing any existing entries.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::ImmutablePayload`] if this `FormData` is
    /// immutable.
    pub fn set(&mut self, key: &str, value: &str) -> FormworkResult<()> {
        if !self.mutable {
            return Err(FormworkError::ImmutablePayload);
        }
        self.entries.retain(|(k, _)| k != key);
        self.entries.push((key.to_string(), value.to_string()));
        Ok(())
    }

    /// Appends an entry for the given key, keeping existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::ImmutablePayload`] if this `FormData` is
    /// immutable.
    pub fn append(&mut self, key: &str, value: &str) -> FormworkResult<()> {
        if !self.mutable {
            return Err(FormworkError::ImmutablePayload);
        }
        self.entries.push((key.to_string(), value.to_string()));
        Ok(())
    }

    /// Returns a mutable copy of this `FormData`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            mutable: true,
        }
    }

    /// Encodes this `FormData` back into a urlencoded string, preserving
    /// entry order.
    pub fn urlencode(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns `true` if this `FormData` is mutable.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Returns the number of entries (not distinct keys).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the payload contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if at least one entry uses the specified key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Returns the distinct keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for (k, _) in &self.entries {
            if !seen.contains(&k.as_str()) {
                seen.push(k.as_str());
            }
        }
        seen
    }
}

/// Decodes a percent-encoded string, treating `+` as a space.
fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Percent-encodes a string for use in a urlencoded body.
fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}
