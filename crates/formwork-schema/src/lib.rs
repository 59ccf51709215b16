//! # formwork-schema
//!
//! Declarative form schemas. A [`Schema`] is an immutable tree of
//! [`FieldDef`]s — scalars with constraints, named objects, and repeating
//! arrays. The same tree drives both the authoritative validator (in
//! `formwork-parse`) and the HTML constraint hints emitted by
//! [`constraint_map`], so the two enforcement points cannot drift.

pub mod hints;
pub mod schema;

pub use hints::{constraint_map, Constraint};
pub use schema::{FieldDef, FieldKind, Schema};
