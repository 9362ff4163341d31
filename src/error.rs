//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body was valid JSON, but it did not match the expected
    /// shape, e.g. a required field was missing or had the wrong type.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The request body could not be parsed as JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// The request did not declare a JSON body with the `Content-Type` header.
    #[error("expected request with `Content-Type: application/json`")]
    MissingJsonContentType,

    /// The query string could not be parsed, e.g. `skip` was negative.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// A connection to the database could not be opened for the request.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not connect to the database: {0}")]
    DatabaseConnection(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::SqlError(value)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(error) => Error::InvalidRequestBody(error.body_text()),
            JsonRejection::JsonSyntaxError(error) => Error::MalformedJson(error.body_text()),
            JsonRejection::MissingJsonContentType(_) => Error::MissingJsonContentType,
            other => Error::MalformedJson(other.body_text()),
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidQuery(rejection.body_text())
    }
}

impl Error {
    /// The HTTP status code that the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequestBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::MalformedJson(_) | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::MissingJsonContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DatabaseConnection(_) | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server side errors are logged in full and replaced with a generic
        // message so that database details are not sent to the client.
        let message = if status.is_server_error() {
            tracing::error!("responding with {status}: {self}");
            "Internal server error, check the server logs for more details.".to_owned()
        } else {
            tracing::debug!("responding with {status}: {self}");
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
