//! Axum extractors for authentication and authorization
//!
//! The gates compose: both role extractors run `CurrentUser` first, so a
//! request with no valid session is always a 401 before any role check
//! can turn it into a 403.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use crate::error::AuthError;
use crate::models::{Role, User};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

/// Extractor for the authenticated principal
///
/// Resolves the session cookie against the session store, then re-fetches
/// the full principal from the user store. The principal is looked up
/// fresh on every request so role changes take effect without a logout.
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::NotAuthenticated)?;
        let cookie = jar.get(SESSION_COOKIE).ok_or(AuthError::NotAuthenticated)?;

        let user_id = app
            .sessions
            .resolve(cookie.value())
            .await
            .ok_or(AuthError::NotAuthenticated)?;

        // A session may outlive its principal; treat that as not logged in.
        let user = app
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// Extractor that requires the admin role
pub struct RequireAdmin(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        match user.role {
            Role::Admin => Ok(RequireAdmin(user)),
            Role::Technician | Role::Customer => Err(AuthError::AccessDenied),
        }
    }
}

/// Extractor that requires a staff role (technician or admin)
pub struct RequireStaff(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireStaff
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        match user.role {
            Role::Admin | Role::Technician => Ok(RequireStaff(user)),
            Role::Customer => Err(AuthError::AccessDenied),
        }
    }
}
