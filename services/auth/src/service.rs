//! Authentication strategy
//!
//! Validates a username/password pair against the principal store and the
//! credential codec, and handles registration. Session creation is the
//! HTTP layer's job; this service only resolves principals.

use anyhow::anyhow;
use std::sync::Arc;
use tracing::info;

use crate::error::{AuthError, AuthResult};
use crate::lockout::{LockoutConfig, LoginLockout};
use crate::models::{NewUser, Role, User};
use crate::password;
use crate::repositories::{DuplicateUsernameError, UserStore};
use crate::validation;

/// Registration payload
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    pub email: Option<String>,
    /// Defaults to `Role::Customer` when not assigned
    pub role: Option<Role>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    lockout: LoginLockout,
}

impl AuthService {
    /// Create a new authentication service with default lockout policy
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self::with_lockout(users, LockoutConfig::default())
    }

    /// Create a new authentication service with an explicit lockout policy
    pub fn with_lockout(users: Arc<dyn UserStore>, lockout: LockoutConfig) -> Self {
        Self {
            users,
            lockout: LoginLockout::new(lockout),
        }
    }

    /// Validate a username/password pair
    ///
    /// An unknown username and a wrong password both come back as
    /// `InvalidCredentials`; the caller learns nothing about which it was.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<User> {
        if self.lockout.is_locked(username).await {
            return Err(AuthError::LockedOut);
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            self.lockout.record_failure(username).await;
            return Err(AuthError::InvalidCredentials);
        };

        // Key derivation is CPU-bound; keep it off the request executor.
        let stored = user.password_hash.clone();
        let attempt = password.to_owned();
        let verified =
            tokio::task::spawn_blocking(move || password::verify_password(&attempt, &stored))
                .await
                .map_err(|e| anyhow!("password verification task failed: {}", e))?;

        if !verified {
            self.lockout.record_failure(username).await;
            return Err(AuthError::InvalidCredentials);
        }

        self.lockout.clear(username).await;
        info!("Authenticated user: {}", user.username);
        Ok(user)
    }

    /// Register a new principal
    ///
    /// A successful registration counts as an authentication: the caller
    /// may create a session immediately without a second credential check.
    pub async fn register(&self, registration: Registration) -> AuthResult<User> {
        validation::validate_username(&registration.username).map_err(AuthError::Validation)?;
        validation::validate_password(&registration.password).map_err(AuthError::Validation)?;
        validation::validate_display_name(&registration.display_name)
            .map_err(AuthError::Validation)?;
        if let Some(email) = registration.email.as_deref() {
            validation::validate_email(email).map_err(AuthError::Validation)?;
        }
        if registration.password != registration.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        if self
            .users
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUsername);
        }

        let plaintext = registration.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
            .await
            .map_err(|e| anyhow!("password hashing task failed: {}", e))?
            .map_err(|e| AuthError::Internal(e.into()))?;

        // The existence check above is not atomic with the insert; a racing
        // registration still loses cleanly on the store's unique constraint.
        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                password_hash,
                role: registration.role.unwrap_or(Role::Customer),
                display_name: registration.display_name,
                email: registration.email,
            })
            .await
            .map_err(|e| {
                if e.is::<DuplicateUsernameError>() {
                    AuthError::DuplicateUsername
                } else {
                    AuthError::Internal(e)
                }
            })?;

        info!("Registered user: {} ({})", user.username, user.role);
        Ok(user)
    }
}
