//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::info;

use crate::error::AuthError;
use crate::extractors::{CurrentUser, RequireAdmin, RequireStaff};
use crate::models::{Role, UserResponse};
use crate::service::Registration;
use crate::session::SESSION_COOKIE;
use crate::state::AppState;

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
        .route("/api/admin/users", get(list_users))
        .route("/api/customers", get(list_customers))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
///
/// A successful registration logs the new principal in immediately: the
/// response carries a fresh session cookie alongside the created user.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Registration attempt for user: {}", payload.username);

    let user = state
        .auth
        .register(Registration {
            username: payload.username,
            password: payload.password,
            confirm_password: payload.confirm_password,
            display_name: payload.display_name,
            email: payload.email,
            role: payload.role,
        })
        .await?;

    let cookie_value = state.sessions.create_session(user.id, false).await;
    let cookie = state.sessions.set_cookie_header(&cookie_value, false);

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(UserResponse::from(user)),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for user: {}", payload.username);

    let user = state
        .auth
        .authenticate(&payload.username, &payload.password)
        .await?;

    let cookie_value = state
        .sessions
        .create_session(user.id, payload.remember_me)
        .await;
    let cookie = state
        .sessions
        .set_cookie_header(&cookie_value, payload.remember_me);

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(UserResponse::from(user)),
    ))
}

/// Logout endpoint
///
/// Destroying an absent session is fine; logout always succeeds.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, state.sessions.clear_cookie_header())]),
        Json(serde_json::json!({"message": "Logged out successfully"})),
    )
}

/// Current principal endpoint
pub async fn current_user(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(UserResponse::from(user))
}

/// Full principal directory, admin only
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuthError> {
    let users = state.users.list().await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(users))
}

/// Customer directory, staff only
pub async fn list_customers(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuthError> {
    let users = state.users.list().await?;
    let customers: Vec<UserResponse> = users
        .into_iter()
        .filter(|u| u.role == Role::Customer)
        .map(UserResponse::from)
        .collect();
    Ok(Json(customers))
}
