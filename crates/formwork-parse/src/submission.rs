//! Submission parsing and async refinement.
//!
//! [`parse`] runs the synchronous pipeline: decode, coerce, validate.
//! [`parse_with_refinement`] additionally runs one asynchronous check
//! batch — cross-field rules, external lookups such as uniqueness — but
//! only after synchronous validation succeeds. A payload that fails the
//! synchronous phase never reaches the refiner.
//!
//! Refinement runs under a mandatory timeout: the upstream design left
//! the async check unbounded, which blocks the request forever when the
//! external collaborator never answers. Here an elapsed timeout is
//! recorded as a form-level issue and the submission resolves to an error
//! reply.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use formwork_core::FormData;
use formwork_schema::Schema;

use crate::candidate::{decode, raw_echo};
use crate::reply::{ReplyStatus, SubmissionReply};
use crate::validate::{validate_root, FieldErrors};
use crate::value::FormValue;

/// Form-level message recorded when the refinement batch times out.
pub const REFINEMENT_TIMEOUT_MESSAGE: &str =
    "Could not complete validation. Please try again later.";

/// The result of validating one submission: success and error are
/// mutually exclusive, and the typed value exists only on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every check passed; the typed value is available.
    Success {
        /// The coerced, structured form value.
        value: FormValue,
    },
    /// One or more checks failed; only the raw echo is retained.
    Error {
        /// Messages per canonical field path.
        field_errors: FieldErrors,
        /// Messages scoped to the form as a whole.
        form_errors: Vec<String>,
    },
}

/// A parsed submission: the validation outcome plus the raw-value echo
/// used to re-populate the form on redisplay.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    outcome: Outcome,
    raw_values: BTreeMap<String, String>,
}

impl Submission {
    /// Returns the validation outcome.
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Returns `true` if validation succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Returns the typed value, if validation succeeded.
    pub const fn value(&self) -> Option<&FormValue> {
        match &self.outcome {
            Outcome::Success { value } => Some(value),
            Outcome::Error { .. } => None,
        }
    }

    /// Builds the serializable reply for the rendering layer.
    ///
    /// A successful submission replies with `Ok` status and no errors; an
    /// error submission replies `Invalid` with its field and form errors.
    /// Both carry the raw echo.
    pub fn reply(&self) -> SubmissionReply {
        match &self.outcome {
            Outcome::Success { .. } => SubmissionReply {
                status: ReplyStatus::Ok,
                field_errors: BTreeMap::new(),
                form_errors: Vec::new(),
                raw_values: self.raw_values.clone(),
            },
            Outcome::Error {
                field_errors,
                form_errors,
            } => SubmissionReply {
                status: ReplyStatus::Invalid,
                field_errors: field_errors.clone(),
                form_errors: form_errors.clone(),
                raw_values: self.raw_values.clone(),
            },
        }
    }
}

/// Issues collected by an asynchronous refinement pass.
#[derive(Debug, Default)]
pub struct Refinement {
    field_issues: FieldErrors,
    form_issues: Vec<String>,
}

impl Refinement {
    /// Records an issue scoped to a field path.
    pub fn add_field_issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.field_issues
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    /// Records an issue scoped to the form as a whole.
    pub fn add_form_issue(&mut self, message: impl Into<String>) {
        self.form_issues.push(message.into());
    }

    /// Returns `true` if no issue has been recorded.
    pub fn is_clean(&self) -> bool {
        self.field_issues.is_empty() && self.form_issues.is_empty()
    }
}

/// An asynchronous cross-field or external-lookup check.
///
/// Refiners receive the already-validated typed value and record issues
/// through the [`Refinement`] context; they are only consulted when the
/// synchronous phase produced no errors.
#[async_trait]
pub trait Refine: Send + Sync {
    /// Inspects the typed value and records any issues found.
    async fn refine(&self, value: &FormValue, refinement: &mut Refinement);
}

/// Parses and validates a payload against a schema, synchronously.
///
/// Never fails: all problems with the payload are reported inside the
/// returned [`Submission`].
pub fn parse(data: &FormData, schema: &Schema) -> Submission {
    let candidate = decode(data, schema);
    let (value, field_errors) = validate_root(&candidate, schema);
    let raw_values = raw_echo(data, schema);

    let outcome = if field_errors.is_empty() {
        Outcome::Success { value }
    } else {
        Outcome::Error {
            field_errors,
            form_errors: Vec::new(),
        }
    };

    Submission {
        outcome,
        raw_values,
    }
}

/// Parses a payload, then runs one asynchronous refinement batch if and
/// only if the synchronous phase succeeded.
///
/// The refinement future is bounded by `timeout`; on elapse a form-level
/// issue is recorded instead of blocking the request.
pub async fn parse_with_refinement(
    data: &FormData,
    schema: &Schema,
    refiner: &dyn Refine,
    timeout: Duration,
) -> Submission {
    let submission = parse(data, schema);

    let Outcome::Success { value } = &submission.outcome else {
        return submission;
    };

    let mut refinement = Refinement::default();
    let run = refiner.refine(value, &mut refinement);
    if tokio::time::timeout(timeout, run).await.is_err() {
        refinement.add_form_issue(REFINEMENT_TIMEOUT_MESSAGE);
    }

    if refinement.is_clean() {
        submission
    } else {
        Submission {
            outcome: Outcome::Error {
                field_errors: refinement.field_issues,
                form_errors: refinement.form_issues,
            },
            raw_values: submission.raw_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use formwork_schema::{FieldDef, FieldKind};

    use super::*;

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

    /// Refiner that flags a fixed email as taken and counts invocations.
    struct DuplicateEmail {
        taken: &'static str,
        calls: AtomicUsize,
    }

    impl DuplicateEmail {
        fn new(taken: &'static str) -> Self {
            Self {
                taken,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Refine for DuplicateEmail {
        async fn refine(&self, value: &FormValue, refinement: &mut Refinement) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if value.get("email").and_then(FormValue::as_str) == Some(self.taken) {
                refinement.add_field_issue("email", "Email already exists");
            }
        }
    }

    /// Refiner that never resolves, for timeout tests.
    struct Stalled;

    #[async_trait]
    impl Refine for Stalled {
        async fn refine(&self, _value: &FormValue, _refinement: &mut Refinement) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }

    #[test]
    fn test_parse_success() {
        let data = FormData::parse("email=a%40b.com&message=a+valid+ten-char+message");
        let submission = parse(&data, &message_schema());
        assert!(submission.is_success());
        let value = submission.value().unwrap();
        assert_eq!(value.get("email").and_then(FormValue::as_str), Some("a@b.com"));
    }

    #[test]
    fn test_parse_error_withholds_value() {
        let data = FormData::parse("email=a%40b.com&message=short");
        let submission = parse(&data, &message_schema());
        assert!(!submission.is_success());
        assert!(submission.value().is_none());
        let Outcome::Error { field_errors, .. } = submission.outcome() else {
            panic!("Expected error outcome");
        };
        assert_eq!(field_errors.get("message").unwrap(), &vec!["Message is too short"]);
    }

    #[test]
    fn test_reply_echoes_raw_values() {
        let data = FormData::parse("email=a%40b.com&message=short");
        let reply = parse(&data, &message_schema()).reply();
        assert_eq!(reply.raw_values.get("message").unwrap(), "short");
        assert_eq!(reply.status, ReplyStatus::Invalid);
    }

    #[test]
    fn test_round_trip_idempotence() {
        let schema = message_schema();
        let data = FormData::parse("email=a%40b.com&message=a+valid+ten-char+message");
        let first = parse(&data, &schema);
        let value = first.value().unwrap().clone();

        let re_encoded = FormData::from_pairs(value.to_payload_entries());
        let second = parse(&re_encoded, &schema);
        assert_eq!(second.value(), Some(&value));
    }

    #[tokio::test]
    async fn test_refinement_flags_duplicate() {
        let refiner = DuplicateEmail::new("a@b.com");
        let data = FormData::parse("email=a%40b.com&message=a+valid+ten-char+message");
        let submission = parse_with_refinement(
            &data,
            &message_schema(),
            &refiner,
            Duration::from_secs(5),
        )
        .await;

        assert!(!submission.is_success());
        let Outcome::Error { field_errors, .. } = submission.outcome() else {
            panic!("Expected error outcome");
        };
        assert_eq!(field_errors.get("email").unwrap(), &vec!["Email already exists"]);
    }

    #[tokio::test]
    async fn test_refinement_passes_clean_value() {
        let refiner = DuplicateEmail::new("taken@b.com");
        let data = FormData::parse("email=a%40b.com&message=a+valid+ten-char+message");
        let submission = parse_with_refinement(
            &data,
            &message_schema(),
            &refiner,
            Duration::from_secs(5),
        )
        .await;
        assert!(submission.is_success());
        assert_eq!(refiner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refinement_short_circuits_on_sync_failure() {
        let refiner = DuplicateEmail::new("a@b.com");
        let data = FormData::parse("email=a%40b.com&message=short");
        let submission = parse_with_refinement(
            &data,
            &message_schema(),
            &refiner,
            Duration::from_secs(5),
        )
        .await;

        assert!(!submission.is_success());
        // The refiner must never run when synchronous validation failed.
        assert_eq!(refiner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refinement_timeout_becomes_form_error() {
        let data = FormData::parse("email=a%40b.com&message=a+valid+ten-char+message");
        let submission = parse_with_refinement(
            &data,
            &message_schema(),
            &Stalled,
            Duration::from_millis(100),
        )
        .await;

        let Outcome::Error { form_errors, .. } = submission.outcome() else {
            panic!("Expected error outcome");
        };
        assert_eq!(form_errors, &vec![REFINEMENT_TIMEOUT_MESSAGE.to_string()]);
    }
}
