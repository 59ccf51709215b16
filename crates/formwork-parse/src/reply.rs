//! The submission reply and terminal action results.
//!
//! A [`SubmissionReply`] is the serializable snapshot the rendering layer
//! consumes to redisplay a form: errors per field path, form-level errors,
//! and the raw values for re-population. It is created fresh for each
//! request/response cycle and never persisted.
//!
//! [`ActionResult`] captures the two terminal states of a submission
//! request: reply-and-redisplay, or redirect-and-move-on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether the reply reflects a validation failure.
///
/// `Invalid` marks structural/constraint/refinement failures and maps to
/// a client-error HTTP status. `Ok` covers everything else — including
/// replies that carry a downstream-failure form error, which are not the
/// submitter's fault and must not surface as a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// Validation passed (the reply may still carry downstream errors).
    Ok,
    /// Validation failed.
    Invalid,
}

/// The serializable echo sent back to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReply {
    /// Validation status of the submission this reply describes.
    pub status: ReplyStatus,
    /// Error messages per canonical field path.
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Form-scoped error messages.
    pub form_errors: Vec<String>,
    /// Last submitted raw value per field path, for re-population.
    pub raw_values: BTreeMap<String, String>,
}

impl SubmissionReply {
    /// Appends form-level errors, e.g. after a persistence failure.
    ///
    /// This is the only way a successful validation regresses to a
    /// user-visible error; the status is deliberately left untouched so
    /// the reply still reports an OK (non-client-error) response.
    #[must_use]
    pub fn with_form_errors<S: Into<String>>(
        mut self,
        errors: impl IntoIterator<Item = S>,
    ) -> Self {
        self.form_errors.extend(errors.into_iter().map(Into::into));
        self
    }

    /// Returns the HTTP status code this reply should travel with.
    pub const fn http_status(&self) -> u16 {
        match self.status {
            ReplyStatus::Invalid => 400,
            ReplyStatus::Ok => 200,
        }
    }

    /// Returns the error messages recorded for a field path.
    pub fn errors_at(&self, path: &str) -> &[String] {
        self.field_errors.get(path).map_or(&[], Vec::as_slice)
    }

    /// Returns the raw submitted value for a field path, if any.
    pub fn raw_value(&self, path: &str) -> Option<&str> {
        self.raw_values.get(path).map(String::as_str)
    }

    /// Returns `true` if the reply carries any field or form errors.
    pub fn has_errors(&self) -> bool {
        !self.field_errors.is_empty() || !self.form_errors.is_empty()
    }
}

/// A terminal submission result: redisplay with a reply, or redirect.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// Redisplay the form; the reply travels with its own HTTP status.
    Reply(SubmissionReply),
    /// Navigate to the given path.
    Redirect(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_reply() -> SubmissionReply {
        SubmissionReply {
            status: ReplyStatus::Ok,
            field_errors: BTreeMap::new(),
            form_errors: Vec::new(),
            raw_values: BTreeMap::from([("email".to_string(), "a@b.com".to_string())]),
        }
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ok_reply().http_status(), 200);
        let invalid = SubmissionReply {
            status: ReplyStatus::Invalid,
            ..ok_reply()
        };
        assert_eq!(invalid.http_status(), 400);
    }

    #[test]
    fn test_with_form_errors_keeps_status() {
        let reply = ok_reply().with_form_errors(["Failed to send the message."]);
        assert_eq!(reply.status, ReplyStatus::Ok);
        assert_eq!(reply.http_status(), 200);
        assert!(reply.has_errors());
        assert_eq!(reply.form_errors, vec!["Failed to send the message."]);
    }

    #[test]
    fn test_accessors() {
        let mut reply = ok_reply();
        reply
            .field_errors
            .insert("email".to_string(), vec!["Email is invalid".to_string()]);
        assert_eq!(reply.errors_at("email"), ["Email is invalid"]);
        assert!(reply.errors_at("missing").is_empty());
        assert_eq!(reply.raw_value("email"), Some("a@b.com"));
    }

    #[test]
    fn test_serialization_shape() {
        let reply = ok_reply();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "ok",
                "field_errors": {},
                "form_errors": [],
                "raw_values": { "email": "a@b.com" },
            })
        );
    }

    #[test]
    fn test_round_trips_through_json() {
        let reply = ok_reply().with_form_errors(["try again"]);
        let json = serde_json::to_string(&reply).unwrap();
        let back: SubmissionReply = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reply);
    }
}
