//! # formwork-core
//!
//! Foundation types shared by the formwork crates:
//!
//! - [`FormworkError`] — the error taxonomy with HTTP status mapping
//! - [`FormData`] — the ordered multi-value payload produced by form encoding
//! - [`FieldPath`] / [`Segment`] — typed paths into nested form structures
//!
//! Validation problems are deliberately *not* part of the error taxonomy:
//! the parser in `formwork-parse` reports them as data, never as `Err`.

pub mod error;
pub mod path;
pub mod payload;

pub use error::{FormworkError, FormworkResult};
pub use path::{FieldPath, Segment};
pub use payload::FormData;
