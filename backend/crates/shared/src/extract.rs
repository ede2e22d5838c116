//! Request Extractors
//!
//! [`ValidJson`] wraps `axum::Json` so that body errors leave as
//! [`AppError`] problem JSON instead of axum's plain-text 422.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::app_error::AppError;
use crate::error::fields::FieldErrors;

/// Field key used when a body error cannot be tied to a field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Lead-in axum puts before the deserializer's message
const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// JSON body whose type errors become 400 field errors
///
/// `{"score": "ten"}` for an integer `score` yields
/// `errors: {"score": ["invalid type: string \"ten\", expected i64 ..."]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

/// Map an axum JSON rejection onto the application error shape
pub fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let detail = std::error::Error::source(&err)
                .map(ToString::to_string)
                .unwrap_or_else(|| err.body_text());
            let detail = detail.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(&detail);
            let (field, message) = split_field(detail);
            AppError::validation(FieldErrors::single(field, message))
        }
        JsonRejection::JsonSyntaxError(err) => {
            let detail = std::error::Error::source(&err)
                .map(ToString::to_string)
                .unwrap_or_else(|| err.body_text());
            AppError::validation(FieldErrors::single(
                NON_FIELD_ERRORS,
                format!("JSON parse error: {detail}"),
            ))
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("Expected request with `Content-Type: application/json`")
        }
        other => AppError::bad_request(other.body_text()),
    }
}

/// Split `"path: message"` into the top-level field and the message.
///
/// `genre[0]: ...` and `profile.bio: ...` report on `genre` and `profile`.
fn split_field(detail: &str) -> (String, String) {
    if let Some((path, message)) = detail.split_once(": ") {
        let field = path
            .split(['.', '['])
            .next()
            .unwrap_or_default();
        let is_path = !field.is_empty()
            && field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if is_path {
            return (field.to_string(), message.to_string());
        }
    }
    (NON_FIELD_ERRORS.to_string(), detail.to_string())
}
