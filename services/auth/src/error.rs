//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for authentication and authorization
///
/// `InvalidCredentials` covers both an unknown username and a wrong
/// password so the caller cannot enumerate accounts.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration conflict on the username
    #[error("Username is already taken")]
    DuplicateUsername,

    /// No valid session attached to the request
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Valid session, insufficient role
    #[error("Access denied")]
    AccessDenied,

    /// Rejected request payload
    #[error("{0}")]
    Validation(String),

    /// Too many failed login attempts
    #[error("Too many failed login attempts, try again later")]
    LockedOut,

    /// Unexpected failure; never leaks internal detail to the client
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::DuplicateUsername => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::NotAuthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::AccessDenied => (StatusCode::FORBIDDEN, self.to_string()),
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::LockedOut => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AuthError::Internal(source) => {
                error!("Internal error: {:#}", source);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for results in the authentication service
pub type AuthResult<T> = Result<T, AuthError>;
