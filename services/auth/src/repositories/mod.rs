//! Principal store implementations

pub mod memory;
pub mod user;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, User};

pub use memory::InMemoryUserStore;
pub use user::PgUserStore;

/// Returned by [`UserStore::create`] when the username is already taken.
///
/// Carried inside the `anyhow` error chain so callers can downcast and
/// report the conflict even when their own existence pre-check lost a
/// race against a concurrent registration.
#[derive(Debug, Error)]
#[error("username already exists")]
pub struct DuplicateUsernameError;

/// Lookup and creation interface over the principal directory.
///
/// The auth service only ever issues single-record reads and writes; the
/// backing store is assumed transactional.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Create a new user; fails if the username is already taken
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// List all users
    async fn list(&self) -> Result<Vec<User>>;
}
