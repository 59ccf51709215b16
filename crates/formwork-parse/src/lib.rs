//! # formwork-parse
//!
//! The submission parser. Turns a raw [`FormData`](formwork_core::FormData)
//! payload plus a [`Schema`](formwork_schema::Schema) into a
//! [`Submission`] — either a typed structured value or a set of field- and
//! form-scoped error messages. Parsing is infallible by design: every
//! problem with the submitted data is reported as data, never as `Err` or
//! a panic.
//!
//! The pipeline:
//!
//! 1. [`candidate::decode`] — reconstruct the nested candidate value from
//!    flat path-keyed entries (unknown keys ignored, array indices sorted).
//! 2. [`validate`](validate::validate_root) — coerce leaves to their
//!    declared types and apply constraints in schema order.
//! 3. Optional async [`Refine`] step for cross-field or external-lookup
//!    checks, run only after synchronous validation succeeds, under a
//!    mandatory timeout.
//! 4. [`Submission::reply`] — the serializable echo the rendering layer
//!    uses to redisplay values and errors.

pub mod candidate;
pub mod reply;
pub mod submission;
pub mod validate;
pub mod value;

pub use candidate::CandidateValue;
pub use reply::{ActionResult, ReplyStatus, SubmissionReply};
pub use submission::{parse, parse_with_refinement, Outcome, Refine, Refinement, Submission};
pub use value::FormValue;
