//! Candidate value reconstruction.
//!
//! The first parsing stage rebuilds the nested structure a form encoding
//! flattened away. Each payload key is parsed once into a typed
//! [`FieldPath`]; entries whose paths are malformed or not reachable from
//! the schema are ignored. Array entries may arrive with explicit indices
//! in any order and with gaps — elements are compacted in ascending index
//! order, since the rendering layer controls index assignment on
//! add/remove. Bare repeated keys on an array path append in submission
//! order after any indexed entries.

use std::collections::BTreeMap;

use formwork_core::{FieldPath, FormData, Segment};
use formwork_schema::{FieldDef, FieldKind, Schema};

/// The structured reconstruction of a payload, before type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateValue {
    /// A raw leaf string, exactly as submitted.
    Leaf(String),
    /// An index-compacted sequence.
    Seq(Vec<CandidateValue>),
    /// A named mapping in first-seen key order.
    Map(Vec<(String, CandidateValue)>),
}

impl CandidateValue {
    /// Returns the entry for a name, if this is a map.
    pub fn get(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find(|(entry_name, _)| entry_name == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// Mutable builder node; sequences keep indexed and appended entries
/// separate until finalization.
enum Node {
    Leaf(String),
    Seq {
        indexed: BTreeMap<usize, Node>,
        appended: Vec<Node>,
    },
    Map(Vec<(String, Node)>),
}

impl Node {
    fn empty_for(def: &FieldDef) -> Self {
        match &def.kind {
            FieldKind::Object { .. } => Self::Map(Vec::new()),
            FieldKind::Array { .. } => Self::Seq {
                indexed: BTreeMap::new(),
                appended: Vec::new(),
            },
            _ => Self::Leaf(String::new()),
        }
    }

    fn finalize(self) -> CandidateValue {
        match self {
            Self::Leaf(s) => CandidateValue::Leaf(s),
            Self::Seq { indexed, appended } => {
                let mut items: Vec<CandidateValue> =
                    indexed.into_values().map(Self::finalize).collect();
                items.extend(appended.into_iter().map(Self::finalize));
                CandidateValue::Seq(items)
            }
            Self::Map(entries) => CandidateValue::Map(
                entries
                    .into_iter()
                    .map(|(name, node)| (name, node.finalize()))
                    .collect(),
            ),
        }
    }
}

/// Decodes a payload into the candidate value for a schema's root object.
///
/// Infallible: entries that cannot be placed (unparseable keys, paths the
/// schema does not declare) are skipped.
pub fn decode(data: &FormData, schema: &Schema) -> CandidateValue {
    let mut root = Node::Map(Vec::new());

    for (key, value) in data.entries() {
        let Ok(path) = FieldPath::parse(key) else {
            continue;
        };
        if schema.field_at(&path).is_none() {
            continue;
        }
        insert(&mut root, schema.root(), path.segments(), value);
    }

    root.finalize()
}

/// Returns the raw-string echo of the schema-known payload entries, keyed
/// by canonical path, last value winning.
pub fn raw_echo(data: &FormData, schema: &Schema) -> BTreeMap<String, String> {
    let mut echo = BTreeMap::new();
    for (key, value) in data.entries() {
        let Ok(path) = FieldPath::parse(key) else {
            continue;
        };
        if schema.field_at(&path).is_some() {
            echo.insert(path.to_string(), value.to_string());
        }
    }
    echo
}

fn insert(node: &mut Node, def: &FieldDef, segments: &[Segment], value: &str) {
    let Some((head, rest)) = segments.split_first() else {
        match (&def.kind, node) {
            // A bare key addressing an array appends one element.
            (FieldKind::Array { element, .. }, Node::Seq { appended, .. }) => {
                let mut leaf = Node::empty_for(element);
                insert(&mut leaf, element, &[], value);
                appended.push(leaf);
            }
            // A leaf write onto an object container has no meaning; drop it.
            (FieldKind::Object { .. }, _) => {}
            (_, node) => *node = Node::Leaf(value.to_string()),
        }
        return;
    };

    // The path resolved against the schema, so the child always exists.
    let Some(child_def) = def.child(head) else {
        return;
    };

    match (head, node) {
        (Segment::Field(name), Node::Map(entries)) => {
            let position = entries.iter().position(|(entry_name, _)| entry_name == name);
            let slot = match position {
                Some(i) => &mut entries[i].1,
                None => {
                    entries.push((name.clone(), Node::empty_for(child_def)));
                    &mut entries.last_mut().expect("just pushed").1
                }
            };
            insert(slot, child_def, rest, value);
        }
        (Segment::Index(index), Node::Seq { indexed, .. }) => {
            let slot = indexed
                .entry(*index)
                .or_insert_with(|| Node::empty_for(child_def));
            insert(slot, child_def, rest, value);
        }
        // Shape mismatch between what was already built and this entry;
        // the earlier entries win.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_schema::FieldDef;

    fn message_schema() -> Schema {
        Schema::new([("email", FieldDef::email()), ("message", FieldDef::text())])
    }

    fn user_schema() -> Schema {
        Schema::new([
            ("name", FieldDef::text()),
            ("emails", FieldDef::array(FieldDef::email())),
        ])
    }

    fn editor_schema() -> Schema {
        Schema::new([(
            "contacts",
            FieldDef::array(FieldDef::object([
                ("mobile", FieldDef::text()),
                ("email", FieldDef::email().optional()),
            ])),
        )])
    }

    #[test]
    fn test_decode_flat() {
        let data = FormData::parse("email=a%40b.com&message=hello");
        let candidate = decode(&data, &message_schema());
        assert_eq!(
            candidate.get("email"),
            Some(&CandidateValue::Leaf("a@b.com".into()))
        );
        assert_eq!(
            candidate.get("message"),
            Some(&CandidateValue::Leaf("hello".into()))
        );
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let data = FormData::parse("email=a%40b.com&csrf_token=abc&nested.thing=1");
        let candidate = decode(&data, &message_schema());
        assert!(candidate.get("csrf_token").is_none());
        assert!(candidate.get("email").is_some());
    }

    #[test]
    fn test_decode_ignores_malformed_keys() {
        let data = FormData::parse("email=a%40b.com&bad%5Bkey=1");
        let candidate = decode(&data, &message_schema());
        if let CandidateValue::Map(entries) = &candidate {
            assert_eq!(entries.len(), 1);
        } else {
            panic!("Expected map");
        }
    }

    #[test]
    fn test_decode_array_sorted_by_index() {
        // Arrival order 2, 0, 1 with values c, a, b: reconstruction must
        // order by ascending index.
        let data = FormData::parse("emails%5B2%5D=c&emails%5B0%5D=a&emails%5B1%5D=b");
        let candidate = decode(&data, &user_schema());
        assert_eq!(
            candidate.get("emails"),
            Some(&CandidateValue::Seq(vec![
                CandidateValue::Leaf("a".into()),
                CandidateValue::Leaf("b".into()),
                CandidateValue::Leaf("c".into()),
            ]))
        );
    }

    #[test]
    fn test_decode_array_gaps_compact() {
        let data = FormData::parse("emails%5B5%5D=x&emails%5B9%5D=y");
        let candidate = decode(&data, &user_schema());
        assert_eq!(
            candidate.get("emails"),
            Some(&CandidateValue::Seq(vec![
                CandidateValue::Leaf("x".into()),
                CandidateValue::Leaf("y".into()),
            ]))
        );
    }

    #[test]
    fn test_decode_bare_repeated_keys_append_in_order() {
        let data = FormData::parse("emails=a&emails=b");
        let candidate = decode(&data, &user_schema());
        assert_eq!(
            candidate.get("emails"),
            Some(&CandidateValue::Seq(vec![
                CandidateValue::Leaf("a".into()),
                CandidateValue::Leaf("b".into()),
            ]))
        );
    }

    #[test]
    fn test_decode_nested_array_of_objects() {
        let data = FormData::parse(
            "contacts%5B1%5D.mobile=456&contacts%5B0%5D.mobile=123&contacts%5B0%5D.email=a%40b.com",
        );
        let candidate = decode(&data, &editor_schema());
        let contacts = candidate.get("contacts").unwrap();
        if let CandidateValue::Seq(items) = contacts {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].get("mobile"), Some(&CandidateValue::Leaf("123".into())));
            assert_eq!(
                items[0].get("email"),
                Some(&CandidateValue::Leaf("a@b.com".into()))
            );
            assert_eq!(items[1].get("mobile"), Some(&CandidateValue::Leaf("456".into())));
        } else {
            panic!("Expected seq");
        }
    }

    #[test]
    fn test_decode_duplicate_leaf_last_wins() {
        let data = FormData::parse("message=first&message=second");
        let candidate = decode(&data, &message_schema());
        assert_eq!(
            candidate.get("message"),
            Some(&CandidateValue::Leaf("second".into()))
        );
    }

    #[test]
    fn test_raw_echo_known_paths_only() {
        let data = FormData::parse("email=a%40b.com&unknown=1&message=hi");
        let echo = raw_echo(&data, &message_schema());
        assert_eq!(echo.get("email").unwrap(), "a@b.com");
        assert_eq!(echo.get("message").unwrap(), "hi");
        assert!(!echo.contains_key("unknown"));
    }

    #[test]
    fn test_raw_echo_canonical_paths() {
        let data = FormData::parse("contacts%5B0%5D.mobile=123");
        let echo = raw_echo(&data, &editor_schema());
        assert_eq!(echo.get("contacts[0].mobile").unwrap(), "123");
    }
}
