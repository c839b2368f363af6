use std::sync::Arc;

use actix_web::cookie::{time, Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AppResult};
use crate::models::{Email, ExpiryTime, SessionId, UserId};
use crate::services::UserService;
use crate::validate::{required, Field};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// A session handed out by a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Issues, resolves and ends sessions.
///
/// This is the boundary where session tokens are generated and passwords are
/// compared; record keeping is delegated to [`UserService`].
pub struct SessionAuthenticator {
    users: Arc<UserService>,
    hasher: Arc<dyn PasswordHasher>,
    ttl: Duration,
}

impl SessionAuthenticator {
    pub fn new(users: Arc<UserService>, hasher: Arc<dyn PasswordHasher>, ttl: Duration) -> Self {
        Self { users, hasher, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Checks the credentials and opens a new session.
    ///
    /// An unknown email and a wrong password both fail with `InvalidCredentials`.
    pub async fn login(&self, email: &Email, password: &str) -> AppResult<IssuedSession> {
        required(password, Field::Password)?;

        let (user_id, password_hash) = match self.users.lookup_user(email).await {
            Ok(found) => found,
            Err(AppError::NotFound(_)) => {
                debug!("login for unknown email");
                return Err(AppError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };
        if !self.hasher.verify(password, &password_hash)? {
            debug!("wrong password for user {}", user_id);
            return Err(AppError::InvalidCredentials);
        }

        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(format!("session ttl {} out of range", self.ttl)))?;
        let session = IssuedSession {
            session_id: SessionId::generate(),
            user_id,
            expires_at,
        };
        self.users
            .create_session(
                &session.session_id,
                &session.user_id,
                &ExpiryTime::at(session.expires_at),
            )
            .await?;

        info!("user {} logged in", session.user_id);
        Ok(session)
    }

    /// Resolves a session token to its owner.
    pub async fn authenticate(&self, session_id: &SessionId) -> AppResult<UserId> {
        self.users.authenticate_session(session_id).await
    }

    pub async fn logout(&self, session_id: &SessionId) -> AppResult<()> {
        self.users.logout_session(session_id).await
    }
}

/// Builds the cookie that hands `session` to the client.
pub fn session_cookie(session: &IssuedSession, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session.session_id.to_string())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .finish()
}

/// Builds a cookie that makes the client discard its session token.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(secure)
        .finish();
    cookie.make_removal();
    cookie
}
