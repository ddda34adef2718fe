//! API response envelopes
//!
//! Successful responses are wrapped in `{ "data": ... }`, failures in
//! `{ "error": "...", "description": "..." }`

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::redirects::ValidationError;
use crate::storage;
use crate::users::Role;

/// Data of a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: Option<V>,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: V) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    /// No body at all, `204 No Content`
    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            data: None,
        }
    }

    fn with_status(status_code: StatusCode, data: V) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

#[derive(Serialize)]
struct DataEnvelope<D> {
    data: D,
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        match self.data {
            Some(data) => (self.status_code, Json(DataEnvelope { data })).into_response(),
            None => self.status_code.into_response(),
        }
    }
}

/// A failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
}

impl Error {
    pub fn bad_request(message: impl ToString) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl ToString) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl ToString) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Logged, the operator only sees the message
    pub fn internal_server_error(message: impl ToString) -> Self {
        let error = Self::new(StatusCode::INTERNAL_SERVER_ERROR, message);
        tracing::error!("Internal server error: {}", error.message);

        error
    }

    pub fn with_description(mut self, description: impl ToString) -> Self {
        self.description = Some(description.to_string());
        self
    }

    fn new(status_code: StatusCode, message: impl ToString) -> Self {
        Self {
            status_code,
            message: message.to_string(),
            description: None,
        }
    }
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        match err {
            storage::Error::DuplicateSlug => Self::bad_request(err),
            storage::Error::Connection(_) => Self::internal_server_error(err),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err)
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            error: self.message,
            description: self.description,
        };

        (self.status_code, Json(envelope)).into_response()
    }
}

impl Role {
    /// Admins can do everything, managers only what requires a manager
    pub fn is_allowed(self, required_role: Role) -> Result<(), Error> {
        if self == Role::Admin || required_role == Role::Manager {
            Ok(())
        } else {
            Err(Error::forbidden("Not allowed to access"))
        }
    }
}
