use std::sync::Arc;

use chrono::Duration;

use crate::auth::{PasswordHasher, SessionAuthenticator};
use crate::services::{TaskService, UserService};
use crate::store::Store;

/// Session lifetime and cookie attributes.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub enforce_expiry: bool,
    pub cookie_secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::days(14),
            enforce_expiry: false,
            cookie_secure: false,
        }
    }
}

/// Everything the handlers share, wired over a single [`Store`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub users: Arc<UserService>,
    pub tasks: Arc<TaskService>,
    pub sessions: Arc<SessionAuthenticator>,
    pub settings: SessionSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn PasswordHasher>,
        settings: SessionSettings,
    ) -> Self {
        let users = Arc::new(
            UserService::new(Arc::clone(&store), Arc::clone(&hasher))
                .with_expiry_enforcement(settings.enforce_expiry),
        );
        let sessions = Arc::new(SessionAuthenticator::new(
            Arc::clone(&users),
            hasher,
            settings.ttl,
        ));
        Self {
            users,
            tasks: Arc::new(TaskService::new(Arc::clone(&store))),
            store,
            sessions,
            settings,
        }
    }
}
