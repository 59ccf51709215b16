//! Error types for the formwork crates.
//!
//! [`FormworkError`] covers the small set of genuinely fallible operations
//! in the toolkit: payload mutation, path parsing, and boundary-layer
//! concerns (unsupported media types, missing routes). Validation outcomes
//! are data, not errors — see `formwork-parse`.

use thiserror::Error;

/// The primary error type for the formwork toolkit.
///
/// Each variant maps to an HTTP status code via [`FormworkError::status_code`],
/// so boundary layers can translate an error into a response without
/// inspecting variants individually.
#[derive(Error, Debug)]
pub enum FormworkError {
    /// The request is malformed in a way the caller can fix.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body carried a content type the extractor cannot decode.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// No handler is registered for the requested path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The handler exists but does not accept the request method.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// A form key could not be parsed into a [`FieldPath`](crate::FieldPath).
    #[error("Invalid field path: {0:?}")]
    InvalidPath(String),

    /// A mutation was attempted on an immutable [`FormData`](crate::FormData).
    #[error("This FormData instance is immutable")]
    ImmutablePayload,

    /// Serialization of a reply or value failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred (settings files, sockets).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormworkError {
    /// Returns the HTTP status code associated with this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::InvalidPath(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::UnsupportedMediaType(_) => 415,
            Self::ImmutablePayload | Self::SerializationError(_) | Self::IoError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, FormworkError>`.
pub type FormworkResult<T> = Result<T, FormworkError>;
