//! Typed field paths.
//!
//! Form encodings flatten nested structure into key strings like
//! `contacts[0].email`. [`FieldPath`] parses such a key exactly once into a
//! sequence of typed [`Segment`] tokens, so every later stage (payload
//! decoding, validation, error reporting) works on tokens rather than
//! re-splitting strings at each call site.

use std::fmt;

use crate::error::{FormworkError, FormworkResult};

/// One step of a [`FieldPath`]: descent into a named field or an array slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object descent by field name.
    Field(String),
    /// Array descent by zero-based index.
    Index(usize),
}

/// A parsed path identifying a leaf or container within a form structure.
///
/// # Examples
///
/// ```
/// use formwork_core::{FieldPath, Segment};
///
/// let path = FieldPath::parse("contacts[0].email").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[
///         Segment::Field("contacts".into()),
///         Segment::Index(0),
///         Segment::Field("email".into()),
///     ]
/// );
/// assert_eq!(path.to_string(), "contacts[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, addressing the form root.
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a path from pre-built segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parses dotted/bracket notation into a typed path.
    ///
    /// Accepted grammar: dot-separated parts, each a non-empty field name
    /// followed by zero or more `[n]` index groups with decimal indices.
    ///
    /// # Errors
    ///
    /// Returns [`FormworkError::InvalidPath`] for empty parts, missing
    /// names before an index group, unterminated brackets, or non-numeric
    /// indices.
    pub fn parse(raw: &str) -> FormworkResult<Self> {
        let invalid = || FormworkError::InvalidPath(raw.to_string());

        if raw.is_empty() {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, mut rest) = match part.find('[') {
                None => (part, ""),
                Some(i) => (&part[..i], &part[i..]),
            };
            if name.is_empty() {
                return Err(invalid());
            }
            segments.push(Segment::Field(name.to_string()));

            while !rest.is_empty() {
                if !rest.starts_with('[') {
                    return Err(invalid());
                }
                let close = rest.find(']').ok_or_else(invalid)?;
                let index: usize = rest[1..close].parse().map_err(|_| invalid())?;
                segments.push(Segment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    /// Returns the path's segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path extended with a named-field segment.
    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(name.to_string()));
        Self { segments }
    }

    /// Returns a new path extended with an array-index segment.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
