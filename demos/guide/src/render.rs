//! Server-side HTML rendering.
//!
//! Small string builders for the guide's pages. Inputs derive their native
//! validation attributes from schema constraint hints and re-populate
//! values and errors from the last submission reply. Attribute output is
//! deterministically ordered.

use formwork_parse::SubmissionReply;
use formwork_schema::Constraint;

/// Escapes text for HTML element and attribute contexts.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Derives an HTML `id` from a field path (`contacts[0].email` ->
/// `contacts-0-email`).
pub fn field_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

/// Renders constraint hints as native validation attributes.
pub fn constraint_attrs(constraint: Option<&Constraint>) -> String {
    let Some(c) = constraint else {
        return String::new();
    };
    let mut attrs = String::new();
    if c.required {
        attrs.push_str(" required");
    }
    if let Some(min) = c.min_length {
        attrs.push_str(&format!(r#" minlength="{min}""#));
    }
    if let Some(max) = c.max_length {
        attrs.push_str(&format!(r#" maxlength="{max}""#));
    }
    if let Some(min) = c.min {
        attrs.push_str(&format!(r#" min="{}""#, format_bound(min)));
    }
    if let Some(max) = c.max {
        attrs.push_str(&format!(r#" max="{}""#, format_bound(max)));
    }
    if let Some(pattern) = &c.pattern {
        attrs.push_str(&format!(r#" pattern="{}""#, escape(pattern)));
    }
    attrs
}

fn format_bound(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Renders the error messages recorded for one field path.
pub fn field_errors(reply: Option<&SubmissionReply>, name: &str) -> String {
    let messages = reply.map_or(&[][..], |r| r.errors_at(name));
    let id = field_id(name);
    let body = messages
        .iter()
        .map(|m| escape(m))
        .collect::<Vec<_>>()
        .join("<br />");
    format!(r#"<div id="{id}-error" class="error">{body}</div>"#)
}

/// Renders a labelled `<input>` with constraint attributes, the last
/// submitted value, and the field's error list.
pub fn input_field(
    label: &str,
    name: &str,
    input_type: &str,
    constraint: Option<&Constraint>,
    reply: Option<&SubmissionReply>,
) -> String {
    let id = field_id(name);
    let value = reply.and_then(|r| r.raw_value(name)).unwrap_or_default();
    format!(
        r#"<div>
  <label for="{id}">{}</label>
  <input type="{input_type}" id="{id}" name="{}" value="{}"{} />
  {}
</div>"#,
        escape(label),
        escape(name),
        escape(value),
        constraint_attrs(constraint),
        field_errors(reply, name),
    )
}

/// Renders a labelled `<textarea>`.
pub fn textarea_field(
    label: &str,
    name: &str,
    constraint: Option<&Constraint>,
    reply: Option<&SubmissionReply>,
) -> String {
    let id = field_id(name);
    let value = reply.and_then(|r| r.raw_value(name)).unwrap_or_default();
    format!(
        r#"<div>
  <label for="{id}">{}</label>
  <textarea id="{id}" name="{}" rows="4"{}>{}</textarea>
  {}
</div>"#,
        escape(label),
        escape(name),
        constraint_attrs(constraint),
        escape(value),
        field_errors(reply, name),
    )
}

/// Renders a labelled checkbox, re-ticked when the reply echoes `"on"`.
pub fn checkbox_field(label: &str, name: &str, reply: Option<&SubmissionReply>) -> String {
    let id = field_id(name);
    let checked = if reply.and_then(|r| r.raw_value(name)) == Some("on") {
        " checked"
    } else {
        ""
    };
    format!(
        r#"<div>
  <label for="{id}"><input type="checkbox" id="{id}" name="{}"{checked} /> {}</label>
</div>"#,
        escape(name),
        escape(label),
    )
}

/// Renders the form-level error list.
pub fn form_errors(reply: Option<&SubmissionReply>) -> String {
    let messages = reply.map_or(&[][..], |r| r.form_errors.as_slice());
    let body = messages
        .iter()
        .map(|m| escape(m))
        .collect::<Vec<_>>()
        .join("<br />");
    format!(r#"<div id="form-error" class="error">{body}</div>"#)
}

/// Wraps page content in the shared chrome.
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{}</title></head>
<body>
<nav><a href="/">Home</a></nav>
<main>
{body}
</main>
</body>
</html>"#,
        escape(title),
    )
}
