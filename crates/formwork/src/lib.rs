//! # formwork
//!
//! Declarative form validation and submission for server-rendered Rust
//! web applications.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `formwork` for the whole toolkit, or on individual
//! crates for finer-grained control.

/// Foundation types: errors, raw payloads, typed field paths.
pub use formwork_core as core;

/// Declarative schemas and HTML constraint hints.
pub use formwork_schema as schema;

/// Submission parsing, validation, refinement, and replies.
pub use formwork_parse as parse;

/// axum integration: extraction, responses, reconciliation.
pub use formwork_axum as axum;
