//! Application state shared across handlers

use std::sync::Arc;

use crate::repositories::UserStore;
use crate::service::AuthService;
use crate::session::SessionManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub auth: AuthService,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, auth: AuthService, sessions: SessionManager) -> Self {
        Self {
            users,
            auth,
            sessions,
        }
    }
}
