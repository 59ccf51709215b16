//! # formwork-axum
//!
//! Connects the formwork parsing pipeline to axum handlers:
//!
//! - [`FormPayload`] extracts a raw [`FormData`](formwork_core::FormData)
//!   from a urlencoded request body
//! - [`ActionResult`](formwork_parse::ActionResult) converts into an HTTP
//!   response (JSON reply with its status, or a see-other redirect)
//! - [`reconcile`] bridges a parsed [`Submission`](formwork_parse::Submission)
//!   to the persistence collaborator and produces the terminal result

pub mod extract;
pub mod respond;

pub use extract::{FormPayload, PayloadRejection};
pub use respond::reconcile;
