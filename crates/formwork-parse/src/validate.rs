//! Coercion and constraint validation.
//!
//! Walks a [`CandidateValue`] against a [`Schema`], coercing each leaf to
//! its declared type and applying constraints in schema order. Errors
//! accumulate — every violated constraint on a field is reported, and a
//! failure on one field never hides failures on another.
//!
//! Empty leaf strings count as absent: an empty input submits `""`, and
//! treating that as a value would defeat the presence check.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use formwork_core::FieldPath;
use formwork_schema::{FieldDef, FieldKind, Schema};

use crate::candidate::CandidateValue;
use crate::value::FormValue;

/// Field-scoped error messages keyed by canonical path string.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// Validates a candidate against a schema.
///
/// Returns the typed value and any field errors; the caller withholds the
/// value whenever errors are present.
pub fn validate_root(candidate: &CandidateValue, schema: &Schema) -> (FormValue, FieldErrors) {
    let mut errors = FieldErrors::new();
    let value = validate_def(
        schema.root(),
        Some(candidate),
        &FieldPath::root(),
        &mut errors,
    )
    .unwrap_or_else(|| FormValue::Record(BTreeMap::new()));
    (value, errors)
}

/// Validates one definition against its candidate, recording errors under
/// the given path. Returns `None` for absent optional fields (they are
/// omitted from the parent record).
fn validate_def(
    def: &FieldDef,
    candidate: Option<&CandidateValue>,
    path: &FieldPath,
    errors: &mut FieldErrors,
) -> Option<FormValue> {
    // Normalize emptiness: an empty leaf string is an absent value.
    let candidate = candidate.filter(|c| !matches!(c, CandidateValue::Leaf(s) if s.is_empty()));

    match &def.kind {
        FieldKind::Checkbox => Some(validate_checkbox(candidate)),
        FieldKind::Text { .. } | FieldKind::Email | FieldKind::Number { .. } => {
            let Some(candidate) = candidate else {
                if def.required {
                    push(errors, path, required_message(def));
                }
                return None;
            };
            let CandidateValue::Leaf(raw) = candidate else {
                push(errors, path, invalid_message(def));
                return None;
            };
            validate_scalar(def, raw, path, errors)
        }
        FieldKind::Object { fields } => {
            let Some(candidate) = candidate else {
                if def.required {
                    push(errors, path, required_message(def));
                }
                return None;
            };
            let CandidateValue::Map(_) = candidate else {
                push(errors, path, invalid_message(def));
                return None;
            };
            let mut record = BTreeMap::new();
            for (name, child_def) in fields {
                let child_path = path.field(name);
                if let Some(value) =
                    validate_def(child_def, candidate.get(name), &child_path, errors)
                {
                    record.insert(name.clone(), value);
                }
            }
            Some(FormValue::Record(record))
        }
        FieldKind::Array {
            element,
            min_items,
            max_items,
        } => {
            let Some(candidate) = candidate else {
                if def.required {
                    push(errors, path, required_message(def));
                }
                return None;
            };
            let CandidateValue::Seq(items) = candidate else {
                push(errors, path, invalid_message(def));
                return None;
            };

            // Cardinality bounds apply to the array path itself,
            // independent of per-element validation.
            if let Some(min) = min_items {
                if items.len() < *min {
                    let msg = message(def, "min_items", || {
                        format!("Ensure this field has at least {min} items.")
                    });
                    push(errors, path, msg);
                }
            }
            if let Some(max) = max_items {
                if items.len() > *max {
                    let msg = message(def, "max_items", || {
                        format!("Ensure this field has at most {max} items.")
                    });
                    push(errors, path, msg);
                }
            }

            let values = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    validate_def(element, Some(item), &path.index(i), errors)
                        .unwrap_or(FormValue::Null)
                })
                .collect();
            Some(FormValue::List(values))
        }
    }
}

fn validate_checkbox(candidate: Option<&CandidateValue>) -> FormValue {
    // True iff the checkbox sentinel was submitted; absent or anything
    // else is false.
    let ticked = matches!(candidate, Some(CandidateValue::Leaf(s)) if s == "on");
    FormValue::Bool(ticked)
}

fn validate_scalar(
    def: &FieldDef,
    raw: &str,
    path: &FieldPath,
    errors: &mut FieldErrors,
) -> Option<FormValue> {
    let mut violations = Vec::new();

    let value = match &def.kind {
        FieldKind::Text {
            min_length,
            max_length,
            pattern,
        } => {
            if let Some(min) = min_length {
                if raw.chars().count() < *min {
                    violations.push(message(def, "min_length", || {
                        format!(
                            "Ensure this value has at least {min} characters (it has {}).",
                            raw.chars().count()
                        )
                    }));
                }
            }
            if let Some(max) = max_length {
                if raw.chars().count() > *max {
                    violations.push(message(def, "max_length", || {
                        format!(
                            "Ensure this value has at most {max} characters (it has {}).",
                            raw.chars().count()
                        )
                    }));
                }
            }
            if let Some(pattern) = pattern {
                match Regex::new(pattern) {
                    Ok(re) => {
                        if !re.is_match(raw) {
                            violations.push(message(def, "pattern", || {
                                "Enter a valid value.".to_string()
                            }));
                        }
                    }
                    Err(e) => violations.push(format!("Invalid pattern: {e}")),
                }
            }
            FormValue::Text(raw.to_string())
        }
        FieldKind::Email => {
            if !EMAIL_RE.is_match(raw) {
                violations.push(message(def, "email", || {
                    "Enter a valid email address.".to_string()
                }));
            }
            FormValue::Text(raw.to_string())
        }
        FieldKind::Number {
            min_value,
            max_value,
        } => match raw.parse::<f64>() {
            Ok(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        violations.push(message(def, "min_value", || {
                            format!("Ensure this value is greater than or equal to {min}.")
                        }));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        violations.push(message(def, "max_value", || {
                            format!("Ensure this value is less than or equal to {max}.")
                        }));
                    }
                }
                FormValue::Number(n)
            }
            Err(_) => {
                violations.push(message(def, "invalid_type", || "Enter a number.".to_string()));
                FormValue::Null
            }
        },
        _ => unreachable!("validate_scalar called for a non-scalar kind"),
    };

    if violations.is_empty() {
        Some(value)
    } else {
        errors.entry(path.to_string()).or_default().extend(violations);
        None
    }
}

fn push(errors: &mut FieldErrors, path: &FieldPath, msg: String) {
    errors.entry(path.to_string()).or_default().push(msg);
}

fn message(def: &FieldDef, code: &str, default: impl FnOnce() -> String) -> String {
    def.error_messages
        .get(code)
        .cloned()
        .unwrap_or_else(default)
}

fn required_message(def: &FieldDef) -> String {
    message(def, "required", || "This field is required.".to_string())
}

fn invalid_message(def: &FieldDef) -> String {
    message(def, "invalid", || "Enter a valid value.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::FormData;

    use crate::candidate::decode;

    fn validate(data: &str, schema: &Schema) -> (FormValue, FieldErrors) {
        let payload = FormData::parse(data);
        let candidate = decode(&payload, schema);
        validate_root(&candidate, schema)
    }

    fn message_schema() -> Schema {
        Schema::new([
            (
                "email",
                FieldDef::email()
                    .message("required", "Email is required")
                    .message("email", "Email is invalid"),
            ),
            (
                "message",
                FieldDef::new(FieldKind::Text {
                    min_length: Some(10),
                    max_length: Some(100),
                    pattern: None,
                })
                .message("required", "Message is required")
                .message("min_length", "Message is too short")
                .message("max_length", "Message is too long"),
            ),
        ])
    }

    #[test]
    fn test_valid_flat_payload() {
        let (value, errors) = validate(
            "email=a%40b.com&message=a+valid+ten-char+message",
            &message_schema(),
        );
        assert!(errors.is_empty());
        assert_eq!(value.get("email").and_then(FormValue::as_str), Some("a@b.com"));
    }

    #[test]
    fn test_missing_required_leaf() {
        let (_, errors) = validate("message=long+enough+text", &message_schema());
        assert_eq!(errors.get("email").unwrap(), &vec!["Email is required"]);
    }

    #[test]
    fn test_empty_string_counts_as_absent() {
        let (_, errors) = validate("email=&message=long+enough+text", &message_schema());
        assert_eq!(errors.get("email").unwrap(), &vec!["Email is required"]);
    }

    #[test]
    fn test_custom_constraint_message() {
        let (_, errors) = validate("email=a%40b.com&message=short", &message_schema());
        assert_eq!(errors.get("message").unwrap(), &vec!["Message is too short"]);
    }

    #[test]
    fn test_invalid_email() {
        let (_, errors) = validate(
            "email=not-an-email&message=long+enough+text",
            &message_schema(),
        );
        assert_eq!(errors.get("email").unwrap(), &vec!["Email is invalid"]);
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let (_, errors) = validate("email=bad&message=short", &message_schema());
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("message"));
    }

    #[test]
    fn test_number_coercion() {
        let schema = Schema::new([(
            "age",
            FieldDef::new(FieldKind::Number {
                min_value: Some(1.0),
                max_value: Some(120.0),
            })
            .message("invalid_type", "Age must be a number"),
        )]);
        let (value, errors) = validate("age=30", &schema);
        assert!(errors.is_empty());
        assert_eq!(value.get("age").and_then(FormValue::as_number), Some(30.0));

        let (_, errors) = validate("age=abc", &schema);
        assert_eq!(errors.get("age").unwrap(), &vec!["Age must be a number"]);

        let (_, errors) = validate("age=150", &schema);
        assert_eq!(
            errors.get("age").unwrap(),
            &vec!["Ensure this value is less than or equal to 120."]
        );
    }

    #[test]
    fn test_checkbox_coercion() {
        let schema = Schema::new([("completed", FieldDef::checkbox())]);
        let (value, _) = validate("completed=on", &schema);
        assert_eq!(value.get("completed").and_then(FormValue::as_bool), Some(true));

        let (value, errors) = validate("", &schema);
        assert!(errors.is_empty());
        assert_eq!(value.get("completed").and_then(FormValue::as_bool), Some(false));
    }

    #[test]
    fn test_optional_field_absent_is_omitted() {
        let schema = Schema::new([
            ("name", FieldDef::text()),
            ("note", FieldDef::text().optional()),
        ]);
        let (value, errors) = validate("name=alice", &schema);
        assert!(errors.is_empty());
        assert!(value.get("note").is_none());
    }

    #[test]
    fn test_optional_field_present_still_validated() {
        let schema = Schema::new([("email", FieldDef::email().optional())]);
        let (_, errors) = validate("email=nope", &schema);
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn test_nested_object_error_paths() {
        let schema = Schema::new([(
            "address",
            FieldDef::object([
                (
                    "street",
                    FieldDef::new(FieldKind::Text {
                        min_length: Some(4),
                        max_length: Some(25),
                        pattern: None,
                    })
                    .message("min_length", "Street name is too short"),
                ),
                ("city", FieldDef::text().message("required", "city name is required")),
            ]),
        )]);
        let (_, errors) = validate("address.street=ab", &schema);
        assert_eq!(
            errors.get("address.street").unwrap(),
            &vec!["Street name is too short"]
        );
        assert_eq!(
            errors.get("address.city").unwrap(),
            &vec!["city name is required"]
        );
    }

    #[test]
    fn test_missing_required_object() {
        let schema = Schema::new([("address", FieldDef::object([("street", FieldDef::text())]))]);
        let (_, errors) = validate("", &schema);
        assert_eq!(
            errors.get("address").unwrap(),
            &vec!["This field is required."]
        );
    }

    #[test]
    fn test_array_element_errors_are_indexed() {
        let schema = Schema::new([(
            "emails",
            FieldDef::array(FieldDef::email().message("email", "Invalid email")),
        )]);
        let (_, errors) = validate("emails%5B0%5D=x%40x.com&emails%5B1%5D=not-an-email", &schema);
        assert!(!errors.contains_key("emails[0]"));
        assert_eq!(errors.get("emails[1]").unwrap(), &vec!["Invalid email"]);
    }

    #[test]
    fn test_array_cardinality() {
        let schema = Schema::new([(
            "contacts",
            FieldDef::new(FieldKind::Array {
                element: Box::new(FieldDef::object([("mobile", FieldDef::text())])),
                min_items: None,
                max_items: Some(3),
            })
            .optional(),
        )]);
        let (_, errors) = validate(
            "contacts%5B0%5D.mobile=1&contacts%5B1%5D.mobile=2&contacts%5B2%5D.mobile=3&contacts%5B3%5D.mobile=4",
            &schema,
        );
        assert_eq!(
            errors.get("contacts").unwrap(),
            &vec!["Ensure this field has at most 3 items."]
        );
        // Per-element validation still ran.
        assert!(!errors.contains_key("contacts[0].mobile"));
    }

    #[test]
    fn test_min_items() {
        let schema = Schema::new([(
            "tasks",
            FieldDef::new(FieldKind::Array {
                element: Box::new(FieldDef::object([("content", FieldDef::text())])),
                min_items: Some(1),
                max_items: None,
            }),
        )]);
        let (_, errors) = validate("tasks%5B0%5D.content=", &schema);
        // The lone task has an empty content: the element error is
        // reported, but cardinality is satisfied.
        assert!(!errors.contains_key("tasks"));
        assert!(errors.contains_key("tasks[0].content"));
    }

    #[test]
    fn test_all_violations_collected() {
        let schema = Schema::new([(
            "code",
            FieldDef::new(FieldKind::Text {
                min_length: Some(5),
                max_length: None,
                pattern: Some(r"^\d+$".to_string()),
            }),
        )]);
        let (_, errors) = validate("code=ab", &schema);
        let messages = errors.get("code").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("at least 5"));
        assert_eq!(messages[1], "Enter a valid value.");
    }

    #[test]
    fn test_pattern_constraint() {
        let schema = Schema::new([(
            "zipcode",
            FieldDef::new(FieldKind::Text {
                min_length: None,
                max_length: None,
                pattern: Some(r"^\d{5}$".to_string()),
            }),
        )]);
        let (_, errors) = validate("zipcode=12345", &schema);
        assert!(errors.is_empty());
        let (_, errors) = validate("zipcode=abcde", &schema);
        assert!(errors.contains_key("zipcode"));
    }
}
