//! Raw payload extraction from axum requests.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};

use formwork_core::{FormData, FormworkError};

/// Upper bound on accepted form bodies. Form posts are small; anything
/// larger is rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Extractor producing the ordered raw payload of a urlencoded form post.
///
/// # Examples
///
/// ```no_run
/// use formwork_axum::FormPayload;
///
/// async fn action(FormPayload(data): FormPayload) {
///     let _ = data.get("email");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FormPayload(pub FormData);

/// Rejection returned when a payload cannot be extracted.
#[derive(Debug)]
pub struct PayloadRejection(pub FormworkError);

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.0.to_string()).into_response()
    }
}

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.starts_with("application/x-www-form-urlencoded") {
            return Err(PayloadRejection(FormworkError::UnsupportedMediaType(
                content_type,
            )));
        }

        let bytes: Bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| PayloadRejection(FormworkError::BadRequest(e.to_string())))?;
        let body = String::from_utf8_lossy(&bytes);

        Ok(Self(FormData::parse(&body)))
    }
}
