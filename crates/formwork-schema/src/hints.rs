//! HTML constraint hint derivation.
//!
//! [`constraint_map`] walks a schema tree and emits, for every leaf field,
//! the minimal set of native HTML validation attributes (`required`,
//! `minlength`/`maxlength`, `min`/`max`, `pattern`). The rendering layer
//! applies these to its inputs for progressive client-side enforcement;
//! the authoritative check remains the server-side validator driven by the
//! same schema.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::{FieldDef, FieldKind, Schema};

/// Constraint hints for one field, mirroring native HTML input attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Constraint {
    /// Maps to the `required` attribute.
    pub required: bool,
    /// Maps to `minlength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maps to `maxlength`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Maps to `min` on numeric inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maps to `max` on numeric inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Maps to the `pattern` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// `true` on array paths: the field repeats.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
}

/// Derives the constraint-hint map for a schema.
///
/// Keys are template paths: object descent uses dots (`address.street`),
/// array elements use empty brackets (`emails[]`, `contacts[].mobile`).
/// Array paths themselves get an entry with `multiple` set, carrying the
/// cardinality-independent `required` flag. The map is ordered for
/// deterministic rendering and testing.
pub fn constraint_map(schema: &Schema) -> BTreeMap<String, Constraint> {
    let mut map = BTreeMap::new();
    collect(schema.root(), "", &mut map);
    map
}

fn collect(def: &FieldDef, path: &str, map: &mut BTreeMap<String, Constraint>) {
    match &def.kind {
        FieldKind::Object { fields } => {
            for (name, child) in fields {
                let child_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                collect(child, &child_path, map);
            }
        }
        FieldKind::Array { element, .. } => {
            map.insert(
                path.to_string(),
                Constraint {
                    required: def.required,
                    multiple: true,
                    ..Constraint::default()
                },
            );
            collect(element, &format!("{path}[]"), map);
        }
        FieldKind::Text {
            min_length,
            max_length,
            pattern,
        } => {
            map.insert(
                path.to_string(),
                Constraint {
                    required: def.required,
                    min_length: *min_length,
                    max_length: *max_length,
                    pattern: pattern.clone(),
                    ..Constraint::default()
                },
            );
        }
        FieldKind::Number {
            min_value,
            max_value,
        } => {
            map.insert(
                path.to_string(),
                Constraint {
                    required: def.required,
                    min: *min_value,
                    max: *max_value,
                    ..Constraint::default()
                },
            );
        }
        FieldKind::Email | FieldKind::Checkbox => {
            map.insert(
                path.to_string(),
                Constraint {
                    required: def.required,
                    ..Constraint::default()
                },
            );
        }
    }
}
