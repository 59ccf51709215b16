//! Route handlers.
//!
//! One GET page and one POST action per form pattern, mirroring the
//! submission flow end to end: parse the payload against the form's
//! schema, reconcile with the store, then redirect or redisplay.
//!
//! The store handle arrives through [`AppState`] — injected by the
//! process entry point, never a global.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use http::{StatusCode, Uri};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use formwork_axum::{reconcile, respond, FormPayload};
use formwork_core::FormworkError;
use formwork_parse::{
    parse, parse_with_refinement, ActionResult, FormValue, Refine, Refinement, SubmissionReply,
};
use formwork_schema::constraint_map;

use crate::render;
use crate::schemas;
use crate::store::{NewAddress, NewContact, NewUser, Store};

/// Form-level message shown when the store rejects a valid submission.
pub const SEND_FAILURE: &str = "Failed to send the message. Please try again later.";

/// Shared per-request context.
#[derive(Clone)]
pub struct AppState {
    /// The persistence collaborator.
    pub store: Arc<dyn Store>,
    /// Bound on the async refinement batch.
    pub refine_timeout: Duration,
}

/// Refinement check: reject emails that already sent a message.
struct UniqueEmail {
    store: Arc<dyn Store>,
}

#[async_trait]
impl Refine for UniqueEmail {
    async fn refine(&self, value: &FormValue, refinement: &mut Refinement) {
        if let Some(email) = value.get("email").and_then(FormValue::as_str) {
            if self.store.email_taken(email).await {
                refinement.add_field_issue("email", "Email already exists");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Value extraction helpers
// ---------------------------------------------------------------------------

fn text(value: &FormValue, name: &str) -> String {
    value
        .get(name)
        .and_then(FormValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_text(value: &FormValue, name: &str) -> Option<String> {
    value
        .get(name)
        .and_then(FormValue::as_str)
        .map(str::to_string)
}

fn number(value: &FormValue, name: &str) -> i64 {
    value
        .get(name)
        .and_then(FormValue::as_number)
        .unwrap_or_default() as i64
}

fn html_reply(page: String, status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    (status, Html(page)).into_response()
}

/// Distinct array indices echoed for `name[...]` paths, ascending; a
/// single empty slot when nothing was echoed.
fn echoed_indices(reply: Option<&SubmissionReply>, name: &str) -> Vec<usize> {
    let prefix = format!("{name}[");
    let mut indices: Vec<usize> = reply
        .map(|r| {
            r.raw_values
                .keys()
                .filter_map(|key| {
                    key.strip_prefix(&prefix)?
                        .split(']')
                        .next()?
                        .parse::<usize>()
                        .ok()
                })
                .collect()
        })
        .unwrap_or_default();
    indices.sort_unstable();
    indices.dedup();
    if indices.is_empty() {
        indices.push(0);
    }
    indices
}

// ---------------------------------------------------------------------------
// Home and fallback
// ---------------------------------------------------------------------------

pub async fn home(Query(query): Query<HashMap<String, String>>) -> Html<String> {
    let mut body = String::from(
        r#"<h1>formwork guide</h1>
<p>Form patterns, from flat fields to async validation.</p>
<ul>
  <li><a href="/without-formwork">Without the library</a></li>
  <li><a href="/regular-form">Regular form</a></li>
  <li><a href="/nested-form">Nested form</a></li>
  <li><a href="/array-form">Array form</a></li>
  <li><a href="/nested-array-form">Nested array form</a></li>
  <li><a href="/todos">Todos</a></li>
  <li><a href="/async-valid">Async validation</a></li>
  <li><a href="/form-fetcher">Fetcher form</a></li>
  <li><a href="/messages">Messages</a></li>
  <li><a href="/addresses">Addresses</a></li>
  <li><a href="/user">Users</a></li>
</ul>"#,
    );
    if let Some(value) = query.get("value") {
        body.push_str(&format!(
            "<h2>Submitted value</h2><pre>{}</pre>",
            render::escape(value)
        ));
    }
    Html(render::page("formwork guide", &body))
}

pub async fn not_found(uri: Uri) -> Response {
    let err = FormworkError::NotFound(uri.path().to_string());
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::NOT_FOUND);
    let body = format!("<h1>{status}</h1><p>{}</p>", render::escape(&err.to_string()));
    (status, Html(render::page("Not found", &body))).into_response()
}

// ---------------------------------------------------------------------------
// Message forms (flat schema)
// ---------------------------------------------------------------------------

fn message_form(action: &str, intro: Option<&str>, reply: Option<&SubmissionReply>) -> String {
    let hints = constraint_map(&schemas::message_schema());
    let intro = intro.map_or_else(String::new, |text| format!("<p>{}</p>", render::escape(text)));
    format!(
        r#"{intro}<form method="POST" action="{action}">
{}
{}
{}
<button>Send</button>
</form>"#,
        render::input_field("Email", "email", "email", hints.get("email"), reply),
        render::textarea_field("Message", "message", hints.get("message"), reply),
        render::form_errors(reply),
    )
}

pub async fn regular_form_page() -> Html<String> {
    Html(render::page(
        "Regular form",
        &message_form("/regular-form", None, None),
    ))
}

pub async fn regular_form_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let submission = parse(&data, &schemas::message_schema());
    let store = state.store.clone();
    let result = reconcile(submission, "/messages", SEND_FAILURE, move |value| async move {
        store
            .create_message(&text(&value, "email"), &text(&value, "message"))
            .await
    })
    .await;

    match result {
        ActionResult::Reply(reply) => html_reply(
            render::page(
                "Regular form",
                &message_form("/regular-form", None, Some(&reply)),
            ),
            reply.http_status(),
        ),
        redirect => respond::into_response(redirect),
    }
}

pub async fn async_valid_page() -> Html<String> {
    Html(render::page(
        "Async validation",
        &message_form("/async-valid", None, None),
    ))
}

pub async fn async_valid_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let refiner = UniqueEmail {
        store: state.store.clone(),
    };
    let submission = parse_with_refinement(
        &data,
        &schemas::message_schema(),
        &refiner,
        state.refine_timeout,
    )
    .await;

    let store = state.store.clone();
    let result = reconcile(submission, "/messages", SEND_FAILURE, move |value| async move {
        store
            .create_message(&text(&value, "email"), &text(&value, "message"))
            .await
    })
    .await;

    match result {
        ActionResult::Reply(reply) => html_reply(
            render::page(
                "Async validation",
                &message_form("/async-valid", None, Some(&reply)),
            ),
            reply.http_status(),
        ),
        redirect => respond::into_response(redirect),
    }
}

pub async fn form_fetcher_page() -> Html<String> {
    Html(render::page(
        "Fetcher form",
        &message_form(
            "/send-message",
            Some("This form posts to a separate action route which replies with JSON."),
            None,
        ),
    ))
}

/// The fetcher action: same validation and persistence as the async form,
/// but the reply travels as JSON with its own status code.
pub async fn send_message_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let refiner = UniqueEmail {
        store: state.store.clone(),
    };
    let submission = parse_with_refinement(
        &data,
        &schemas::message_schema(),
        &refiner,
        state.refine_timeout,
    )
    .await;

    let store = state.store.clone();
    let result = reconcile(submission, "/messages", SEND_FAILURE, move |value| async move {
        store
            .create_message(&text(&value, "email"), &text(&value, "message"))
            .await
    })
    .await;

    respond::into_response(result)
}

// ---------------------------------------------------------------------------
// Without the library: manual decoding and ad hoc checks
// ---------------------------------------------------------------------------

fn without_formwork_form(
    email: &str,
    message: &str,
    field_errors: &BTreeMap<&'static str, Vec<String>>,
    form_errors: &[String],
) -> String {
    let errors_for = |name: &str| {
        field_errors
            .get(name)
            .map(|msgs| msgs.join("<br />"))
            .unwrap_or_default()
    };
    format!(
        r#"<form method="POST" action="/without-formwork">
<div id="form-error" class="error">{}</div>
<div>
  <label for="contact-email">Email</label>
  <input type="email" id="contact-email" name="email" value="{}" required />
  <div class="error">{}</div>
</div>
<div>
  <label for="contact-message">Message</label>
  <textarea id="contact-message" name="message" rows="4" required minlength="10" maxlength="100">{}</textarea>
  <div class="error">{}</div>
</div>
<button>Send</button>
</form>"#,
        form_errors.join("<br />"),
        render::escape(email),
        errors_for("email"),
        render::escape(message),
        errors_for("message"),
    )
}

pub async fn without_formwork_page() -> Html<String> {
    Html(render::page(
        "Without the library",
        &without_formwork_form("", "", &BTreeMap::new(), &[]),
    ))
}

pub async fn without_formwork_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let email = data.get("email").unwrap_or_default().to_string();
    let message = data.get("message").unwrap_or_default().to_string();

    // Ad hoc checks, the shape the library replaces.
    let mut field_errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    if email.is_empty() {
        field_errors.insert("email", vec!["Email is required".to_string()]);
    } else if !email.contains('@') {
        field_errors.insert("email", vec!["Email is invalid".to_string()]);
    }
    if message.is_empty() {
        field_errors.insert("message", vec!["Message is required".to_string()]);
    } else if message.chars().count() < 10 {
        field_errors.insert("message", vec!["Message is too short".to_string()]);
    } else if message.chars().count() > 100 {
        field_errors.insert("message", vec!["Message is too long".to_string()]);
    }

    if !field_errors.is_empty() {
        return html_reply(
            render::page(
                "Without the library",
                &without_formwork_form(&email, &message, &field_errors, &[]),
            ),
            400,
        );
    }

    match state.store.create_message(&email, &message).await {
        Ok(_) => Redirect::to("/messages").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "message not stored");
            html_reply(
                render::page(
                    "Without the library",
                    &without_formwork_form(
                        &email,
                        &message,
                        &BTreeMap::new(),
                        &[SEND_FAILURE.to_string()],
                    ),
                ),
                200,
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Nested form (address)
// ---------------------------------------------------------------------------

fn address_form(reply: Option<&SubmissionReply>) -> String {
    let hints = constraint_map(&schemas::address_schema());
    format!(
        r#"<form method="POST" action="/nested-form">
<fieldset>
<legend>Address Details</legend>
{}
{}
{}
{}
{}
</fieldset>
{}
<button>Save Address</button>
</form>"#,
        render::input_field(
            "Street Address",
            "address.street",
            "text",
            hints.get("address.street"),
            reply,
        ),
        render::input_field(
            "Zipcode",
            "address.zipcode",
            "text",
            hints.get("address.zipcode"),
            reply,
        ),
        render::input_field("City", "address.city", "text", hints.get("address.city"), reply),
        render::input_field(
            "Country",
            "address.country",
            "text",
            hints.get("address.country"),
            reply,
        ),
        render::field_errors(reply, "address"),
        render::form_errors(reply),
    )
}

pub async fn nested_form_page() -> Html<String> {
    Html(render::page("Add New Address", &address_form(None)))
}

pub async fn nested_form_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let submission = parse(&data, &schemas::address_schema());
    let store = state.store.clone();
    let result = reconcile(submission, "/addresses", SEND_FAILURE, move |value| async move {
        let address = value.get("address").cloned().unwrap_or(FormValue::Null);
        store
            .create_address(NewAddress {
                street: text(&address, "street"),
                zipcode: text(&address, "zipcode"),
                city: text(&address, "city"),
                country: text(&address, "country"),
            })
            .await
    })
    .await;

    match result {
        ActionResult::Reply(reply) => html_reply(
            render::page("Add New Address", &address_form(Some(&reply))),
            reply.http_status(),
        ),
        redirect => respond::into_response(redirect),
    }
}

// ---------------------------------------------------------------------------
// Array form (user with repeated emails)
// ---------------------------------------------------------------------------

fn user_form(reply: Option<&SubmissionReply>) -> String {
    let schema = schemas::user_schema();
    let hints = constraint_map(&schema);
    let email_rows: String = echoed_indices(reply, "emails")
        .into_iter()
        .map(|i| {
            render::input_field(
                &format!("Email #{}", i + 1),
                &format!("emails[{i}]"),
                "text",
                hints.get("emails[]"),
                reply,
            )
        })
        .collect();
    format!(
        r#"<form method="POST" action="/array-form">
<h1>Array form</h1>
{}
{}
<ul>
{email_rows}
</ul>
{}
{}
<button>Submit</button>
</form>"#,
        render::input_field("Name:", "name", "text", hints.get("name"), reply),
        render::input_field("Age:", "age", "number", hints.get("age"), reply),
        render::field_errors(reply, "emails"),
        render::form_errors(reply),
    )
}

pub async fn array_form_page() -> Html<String> {
    Html(render::page("Array form", &user_form(None)))
}

pub async fn array_form_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let submission = parse(&data, &schemas::user_schema());
    let store = state.store.clone();
    let result = reconcile(submission, "/user", SEND_FAILURE, move |value| async move {
        let contacts = value
            .get("emails")
            .and_then(FormValue::as_list)
            .unwrap_or(&[])
            .iter()
            .filter_map(FormValue::as_str)
            .map(|email| NewContact {
                mobile: None,
                email: Some(email.to_string()),
            })
            .collect();
        store
            .create_user(NewUser {
                name: text(&value, "name"),
                age: number(&value, "age"),
                contacts,
            })
            .await
    })
    .await;

    match result {
        ActionResult::Reply(reply) => html_reply(
            render::page("Array form", &user_form(Some(&reply))),
            reply.http_status(),
        ),
        redirect => respond::into_response(redirect),
    }
}

// ---------------------------------------------------------------------------
// Nested array form (user with contact fieldsets)
// ---------------------------------------------------------------------------

fn user_editor_form(reply: Option<&SubmissionReply>) -> String {
    let schema = schemas::user_editor_schema();
    let hints = constraint_map(&schema);
    let contact_rows: String = echoed_indices(reply, "contacts")
        .into_iter()
        .map(|i| {
            format!(
                r#"<fieldset>
<legend>Contact #{}</legend>
{}
{}
</fieldset>"#,
                i + 1,
                render::input_field(
                    "Mobile:",
                    &format!("contacts[{i}].mobile"),
                    "text",
                    hints.get("contacts[].mobile"),
                    reply,
                ),
                render::input_field(
                    "Email:",
                    &format!("contacts[{i}].email"),
                    "email",
                    hints.get("contacts[].email"),
                    reply,
                ),
            )
        })
        .collect();
    format!(
        r#"<form method="POST" action="/nested-array-form">
<h1>Create User Profile</h1>
{}
{}
<h2>Contact Information</h2>
{contact_rows}
{}
{}
<button>Save Profile</button>
</form>"#,
        render::input_field("Name:", "name", "text", hints.get("name"), reply),
        render::input_field("Age:", "age", "number", hints.get("age"), reply),
        render::field_errors(reply, "contacts"),
        render::form_errors(reply),
    )
}

pub async fn nested_array_form_page() -> Html<String> {
    Html(render::page("Create User Profile", &user_editor_form(None)))
}

pub async fn nested_array_form_action(
    State(state): State<AppState>,
    FormPayload(data): FormPayload,
) -> Response {
    let submission = parse(&data, &schemas::user_editor_schema());
    let store = state.store.clone();
    let result = reconcile(submission, "/user", SEND_FAILURE, move |value| async move {
        let contacts = value
            .get("contacts")
            .and_then(FormValue::as_list)
            .unwrap_or(&[])
            .iter()
            .map(|contact| NewContact {
                mobile: optional_text(contact, "mobile"),
                email: optional_text(contact, "email"),
            })
            .collect();
        store
            .create_user(NewUser {
                name: text(&value, "name"),
                age: number(&value, "age"),
                contacts,
            })
            .await
    })
    .await;

    match result {
        ActionResult::Reply(reply) => html_reply(
            render::page("Create User Profile", &user_editor_form(Some(&reply))),
            reply.http_status(),
        ),
        redirect => respond::into_response(redirect),
    }
}

// ---------------------------------------------------------------------------
// Todos (array of task fieldsets, no persistence)
// ---------------------------------------------------------------------------

fn todos_form(reply: Option<&SubmissionReply>) -> String {
    let schema = schemas::todos_schema();
    let hints = constraint_map(&schema);
    let task_rows: String = echoed_indices(reply, "tasks")
        .into_iter()
        .map(|i| {
            format!(
                r#"<fieldset>
<legend>Task #{}</legend>
{}
{}
</fieldset>"#,
                i + 1,
                render::input_field(
                    "Content",
                    &format!("tasks[{i}].content"),
                    "text",
                    hints.get("tasks[].content"),
                    reply,
                ),
                render::checkbox_field("Completed", &format!("tasks[{i}].completed"), reply),
            )
        })
        .collect();
    format!(
        r#"<form method="POST" action="/todos">
{}
{}
{task_rows}
{}
<button>Save</button>
</form>"#,
        render::input_field("Title", "title", "text", hints.get("title"), reply),
        render::field_errors(reply, "tasks"),
        render::form_errors(reply),
    )
}

pub async fn todos_page() -> Html<String> {
    Html(render::page("Todos", &todos_form(None)))
}

pub async fn todos_action(FormPayload(data): FormPayload) -> Response {
    let submission = parse(&data, &schemas::todos_schema());

    match submission.value() {
        Some(value) => {
            // No store behind this form: echo the typed value back to the
            // index page.
            let json = serde_json::to_string(value).unwrap_or_default();
            let encoded = utf8_percent_encode(&json, NON_ALPHANUMERIC);
            Redirect::to(&format!("/?value={encoded}")).into_response()
        }
        None => {
            let reply = submission.reply();
            html_reply(
                render::page("Todos", &todos_form(Some(&reply))),
                reply.http_status(),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Listing pages
// ---------------------------------------------------------------------------

pub async fn messages_page(State(state): State<AppState>) -> Html<String> {
    let items: String = state
        .store
        .list_messages()
        .await
        .iter()
        .map(|m| {
            format!(
                "<li>{}: {}</li>",
                render::escape(&m.title),
                render::escape(&m.content)
            )
        })
        .collect();
    Html(render::page(
        "Messages",
        &format!("<h1>Messages</h1><ul>{items}</ul>"),
    ))
}

pub async fn addresses_page(State(state): State<AppState>) -> Html<String> {
    let items: String = state
        .store
        .list_addresses()
        .await
        .iter()
        .map(|a| {
            format!(
                "<li><p>{}</p><div>{}, {}</div><div>{}</div></li>",
                render::escape(&a.street),
                render::escape(&a.city),
                render::escape(&a.zipcode),
                render::escape(&a.country),
            )
        })
        .collect();
    Html(render::page(
        "Addresses",
        &format!("<h1>Addresses</h1><ul>{items}</ul>"),
    ))
}

pub async fn users_page(State(state): State<AppState>) -> Html<String> {
    let items: String = state
        .store
        .list_users()
        .await
        .iter()
        .map(|user| {
            let contacts: String = user
                .contacts
                .iter()
                .map(|c| {
                    format!(
                        "<li>{} {}</li>",
                        render::escape(c.mobile.as_deref().unwrap_or_default()),
                        render::escape(c.email.as_deref().unwrap_or_default()),
                    )
                })
                .collect();
            format!(
                "<li>Name: {} Age: {}<ul>{contacts}</ul></li>",
                render::escape(&user.name),
                user.age,
            )
        })
        .collect();
    Html(render::page(
        "Users",
        &format!("<h1>Users</h1><ol>{items}</ol>"),
    ))
}
