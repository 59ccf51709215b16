//! Form schemas for the guide.
//!
//! One schema per demo form, each the single source for both server-side
//! validation and the HTML constraint hints rendered into the markup.

use formwork_schema::{FieldDef, FieldKind, Schema};

/// The contact-message form: email plus a 10..=100 character message.
pub fn message_schema() -> Schema {
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

/// The nested address form: one `address` object of four bounded fields.
pub fn address_schema() -> Schema {
    Schema::new([(
        "address",
        FieldDef::object([
            (
                "street",
                FieldDef::new(FieldKind::Text {
                    min_length: Some(4),
                    max_length: Some(25),
                    pattern: None,
                })
                .message("required", "Street name is required")
                .message("min_length", "Street name is too short")
                .message("max_length", "Street name is too long"),
            ),
            (
                "zipcode",
                FieldDef::new(FieldKind::Text {
                    min_length: Some(3),
                    max_length: Some(12),
                    pattern: None,
                })
                .message("required", "zipcode is required")
                .message("min_length", "zipcode is too short")
                .message("max_length", "zipcode too long"),
            ),
            (
                "city",
                FieldDef::new(FieldKind::Text {
                    min_length: Some(5),
                    max_length: Some(25),
                    pattern: None,
                })
                .message("required", "city name is required")
                .message("min_length", "city name is too short")
                .message("max_length", "city name too long"),
            ),
            (
                "country",
                FieldDef::new(FieldKind::Text {
                    min_length: Some(5),
                    max_length: Some(25),
                    pattern: None,
                })
                .message("required", "country name is required")
                .message("min_length", "country name is too short")
                .message("max_length", "country name too long"),
            ),
        ]),
    )])
}

/// The array form: a user with a repeating list of email addresses.
pub fn user_schema() -> Schema {
    Schema::new([
        ("name", name_field()),
        ("age", age_field()),
        (
            "emails",
            FieldDef::array(FieldDef::email().message("email", "Invalid email")),
        ),
    ])
}

/// The nested-array form: a user with up to three optional contacts, each
/// holding a required mobile number and an optional email.
pub fn user_editor_schema() -> Schema {
    Schema::new([
        ("name", name_field()),
        ("age", age_field()),
        (
            "contacts",
            FieldDef::new(FieldKind::Array {
                element: Box::new(FieldDef::object([
                    ("mobile", FieldDef::text()),
                    (
                        "email",
                        FieldDef::email().optional().message("email", "Invalid email"),
                    ),
                ])),
                min_items: None,
                max_items: Some(3),
            })
            .optional(),
        ),
    ])
}

/// The todos form: a title plus a non-empty list of tasks.
pub fn todos_schema() -> Schema {
    Schema::new([
        ("title", FieldDef::text()),
        (
            "tasks",
            FieldDef::new(FieldKind::Array {
                element: Box::new(FieldDef::object([
                    ("content", FieldDef::text()),
                    ("completed", FieldDef::checkbox()),
                ])),
                min_items: Some(1),
                max_items: None,
            }),
        ),
    ])
}

fn name_field() -> FieldDef {
    FieldDef::new(FieldKind::Text {
        min_length: Some(5),
        max_length: Some(30),
        pattern: None,
    })
    .message("required", "Name is required")
}

fn age_field() -> FieldDef {
    FieldDef::new(FieldKind::Number {
        min_value: Some(1.0),
        max_value: Some(120.0),
    })
    .message("required", "Age is required")
    .message("invalid_type", "Age must be a number")
    .message("min_value", "Age must be greater than 1")
    .message("max_value", "Age must be less than 120")
}
