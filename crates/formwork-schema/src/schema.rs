//! Schema tree definitions.
//!
//! A schema is a pure description of a form's expected shape: which fields
//! exist, how they nest, and which constraints each leaf carries. Schemas
//! are immutable once built and hold no per-request state.

use std::collections::HashMap;

use formwork_core::{FieldPath, Segment};

/// The type of a field, including type-specific constraint parameters.
///
/// Scalar variants carry the constraints applied after type coercion;
/// container variants describe nesting. The validator in `formwork-parse`
/// dispatches on this enum.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A free-text field.
    Text {
        /// Minimum length in characters.
        min_length: Option<usize>,
        /// Maximum length in characters.
        max_length: Option<usize>,
        /// A regex the value must match.
        pattern: Option<String>,
    },
    /// A numeric field, coerced from its string form.
    Number {
        /// Minimum allowed value (inclusive).
        min_value: Option<f64>,
        /// Maximum allowed value (inclusive).
        max_value: Option<f64>,
    },
    /// An email address field.
    Email,
    /// A checkbox. Present-and-`"on"` coerces to `true`; anything else
    /// (including absence) coerces to `false`.
    Checkbox,
    /// A named mapping of child fields, in declaration order.
    Object {
        /// The child fields as `(name, definition)` pairs.
        fields: Vec<(String, FieldDef)>,
    },
    /// An ordered sequence of values sharing one element definition.
    Array {
        /// The definition every element is validated against.
        element: Box<FieldDef>,
        /// Minimum number of elements.
        min_items: Option<usize>,
        /// Maximum number of elements.
        max_items: Option<usize>,
    },
}

/// Complete definition of one field in a schema tree.
///
/// Construction follows the builder style: a kind-specific constructor,
/// then chained modifiers.
///
/// # Examples
///
/// ```
/// use formwork_schema::{FieldDef, FieldKind};
///
/// let message = FieldDef::new(FieldKind::Text {
///     min_length: Some(10),
///     max_length: Some(100),
///     pattern: None,
/// })
/// .message("required", "Message is required")
/// .message("min_length", "Message is too short");
/// assert!(message.required);
/// ```
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The field kind, controlling coercion and constraints.
    pub kind: FieldKind,
    /// Whether the field must be present. Optional fields skip the
    /// presence check but are still shape- and type-checked when present.
    pub required: bool,
    /// Custom error messages keyed by error code (e.g. `"required"`,
    /// `"min_length"`); defaults apply for codes without an override.
    pub error_messages: HashMap<String, String>,
}

impl FieldDef {
    /// Creates a required field of the given kind with default messages.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            error_messages: HashMap::new(),
        }
    }

    /// An unconstrained text field.
    pub fn text() -> Self {
        Self::new(FieldKind::Text {
            min_length: None,
            max_length: None,
            pattern: None,
        })
    }

    /// An email address field.
    pub fn email() -> Self {
        Self::new(FieldKind::Email)
    }

    /// An unconstrained numeric field.
    pub fn number() -> Self {
        Self::new(FieldKind::Number {
            min_value: None,
            max_value: None,
        })
    }

    /// A checkbox field. Checkboxes are never presence-checked, since an
    /// unticked box submits nothing.
    pub fn checkbox() -> Self {
        Self::new(FieldKind::Checkbox).required(false)
    }

    /// An object of named child fields, in declaration order.
    pub fn object<S: Into<String>>(fields: impl IntoIterator<Item = (S, Self)>) -> Self {
        Self::new(FieldKind::Object {
            fields: fields
                .into_iter()
                .map(|(name, def)| (name.into(), def))
                .collect(),
        })
    }

    /// An unbounded array of the given element definition.
    pub fn array(element: Self) -> Self {
        Self::new(FieldKind::Array {
            element: Box::new(element),
            min_items: None,
            max_items: None,
        })
    }

    /// Sets whether this field is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Marks this field optional.
    #[must_use]
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Sets a custom error message for a given error code.
    #[must_use]
    pub fn message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Looks up the child definition for one path segment, if this field
    /// is a container of the matching shape.
    pub fn child(&self, segment: &Segment) -> Option<&Self> {
        match (&self.kind, segment) {
            (FieldKind::Object { fields }, Segment::Field(name)) => fields
                .iter()
                .find(|(field_name, _)| field_name == name)
                .map(|(_, def)| def),
            (FieldKind::Array { element, .. }, Segment::Index(_)) => Some(element),
            _ => None,
        }
    }
}

/// A complete form schema: an object of named top-level fields.
///
/// Schemas are pure descriptions — building one performs no I/O and the
/// tree never changes afterwards.
#[derive(Debug, Clone)]
pub struct Schema {
    root: FieldDef,
}

impl Schema {
    /// Creates a schema from its top-level fields, in declaration order.
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = (S, FieldDef)>) -> Self {
        Self {
            root: FieldDef::object(fields),
        }
    }

    /// Returns the root object definition.
    pub const fn root(&self) -> &FieldDef {
        &self.root
    }

    /// Resolves a path to the field definition it addresses, if the path
    /// is reachable from this schema. Array indices resolve to the array's
    /// element definition regardless of their value.
    pub fn field_at(&self, path: &FieldPath) -> Option<&FieldDef> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = current.child(segment)?;
        }
        Some(current)
    }
}
