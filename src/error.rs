//! Defines the app level error type and its conversion to JSON HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request carried no auth token, or the token was malformed,
    /// had a bad signature, or had expired.
    #[error("invalid or missing auth token")]
    InvalidAuthToken,

    /// The email/password pair did not match a registered account.
    ///
    /// Covers both an unknown email and a wrong password so that the
    /// response does not reveal which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The caller is authenticated but their role does not allow the
    /// operation.
    #[error("insufficient permissions")]
    Forbidden,

    /// The request was missing required fields or contained malformed
    /// values.
    #[error("{0}")]
    Validation(String),

    /// The role name is not one of the fixed enumeration.
    #[error("invalid role \"{0}\"")]
    InvalidRole(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email already belongs to a registered account.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server,
    /// never sent to the client.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The auth token could not be signed.
    #[error("could not create auth token: {0}")]
    TokenCreation(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that is not visible to the caller.
    ///
    /// Deliberately does not distinguish a missing row from a row owned by
    /// another user, so callers cannot probe which IDs exist.
    #[error("the transaction could not be found")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that is not visible to the caller.
    ///
    /// Deliberately does not distinguish a missing row from a row owned by
    /// another user, so callers cannot probe which IDs exist.
    #[error("the transaction could not be found")]
    DeleteMissingTransaction,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match self {
            Error::InvalidAuthToken | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Validation(_)
            | Error::InvalidRole(_)
            | Error::TooWeak(_)
            | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                let body = Json(json!({ "error": "internal server error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status_code, body).into_response()
    }
}
