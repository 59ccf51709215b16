//! Response conversion and submission reconciliation.
//!
//! The per-request flow is a short state machine:
//!
//! ```text
//! received -> parsing -> validated-error                  -> error reply
//!                     -> validated-success -> persisted   -> redirect
//!                                          -> persist-failed -> error reply
//! ```
//!
//! Both terminal states are captured by
//! [`ActionResult`](formwork_parse::ActionResult); nothing is retried
//! automatically.

use std::fmt::Display;
use std::future::Future;

use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use http::StatusCode;

use formwork_parse::{ActionResult, FormValue, Submission};

/// Converts an [`ActionResult`] into an HTTP response: a 303 redirect, or
/// the JSON reply carrying its own status code.
pub fn into_response(result: ActionResult) -> Response {
    match result {
        ActionResult::Redirect(to) => Redirect::to(&to).into_response(),
        ActionResult::Reply(reply) => {
            let status =
                StatusCode::from_u16(reply.http_status()).unwrap_or(StatusCode::OK);
            (status, Json(reply)).into_response()
        }
    }
}

/// Bridges a parsed submission to the persistence collaborator.
///
/// - A failed validation replies immediately; the collaborator is never
///   consulted.
/// - A successful validation hands the typed value to `persist`. Success
///   redirects to `redirect_to`; failure is logged and demoted to a
///   form-level error reply built from `failure_message` — the only point
///   where a successful validation regresses to a user-visible error.
pub async fn reconcile<T, E, Fut>(
    submission: Submission,
    redirect_to: &str,
    failure_message: &str,
    persist: impl FnOnce(FormValue) -> Fut,
) -> ActionResult
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let Some(value) = submission.value().cloned() else {
        return ActionResult::Reply(submission.reply());
    };

    match persist(value).await {
        Ok(_) => ActionResult::Redirect(redirect_to.to_string()),
        Err(err) => {
            tracing::warn!(error = %err, "persist failed, replying with form error");
            ActionResult::Reply(submission.reply().with_form_errors([failure_message]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use formwork_core::FormData;
    use formwork_parse::{parse, ReplyStatus};
    use formwork_schema::{FieldDef, Schema};

    const FAILURE: &str = "Failed to send the message. Please try again later.";

    fn schema() -> Schema {
        Schema::new([(
            "email",
            FieldDef::email().message("required", "Email is required"),
        )])
    }

    async fn no_persist(_value: FormValue) -> Result<(), std::io::Error> {
        panic!("persist must not run for invalid submissions");
    }

    #[tokio::test]
    async fn test_validation_error_skips_persist() {
        let submission = parse(&FormData::parse(""), &schema());
        let result = reconcile(submission, "/messages", FAILURE, no_persist).await;

        let ActionResult::Reply(reply) = result else {
            panic!("Expected reply");
        };
        assert_eq!(reply.status, ReplyStatus::Invalid);
        assert_eq!(reply.http_status(), 400);
        assert_eq!(reply.errors_at("email"), ["Email is required"]);
    }

    #[tokio::test]
    async fn test_persist_success_redirects() {
        let submission = parse(&FormData::parse("email=a%40b.com"), &schema());
        let result = reconcile(submission, "/messages", FAILURE, |value| async move {
            assert_eq!(value.get("email").and_then(FormValue::as_str), Some("a@b.com"));
            Ok::<(), std::io::Error>(())
        })
        .await;
        assert_eq!(result, ActionResult::Redirect("/messages".to_string()));
    }

    #[tokio::test]
    async fn test_persist_failure_becomes_form_error() {
        let submission = parse(&FormData::parse("email=a%40b.com"), &schema());
        let result = reconcile(submission, "/messages", FAILURE, |_| async {
            Err::<(), _>(std::io::Error::other("store down"))
        })
        .await;

        let ActionResult::Reply(reply) = result else {
            panic!("Expected reply");
        };
        // Not the submitter's fault: OK status, form-scoped message.
        assert_eq!(reply.status, ReplyStatus::Ok);
        assert_eq!(reply.http_status(), 200);
        assert_eq!(reply.form_errors, vec![FAILURE]);
        assert!(reply.field_errors.is_empty());
        // Raw values still echoed for re-population.
        assert_eq!(reply.raw_value("email"), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_into_response_statuses() {
        let redirect = into_response(ActionResult::Redirect("/messages".into()));
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);

        let submission = parse(&FormData::parse(""), &schema());
        let reply = into_response(ActionResult::Reply(submission.reply()));
        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
    }
}
