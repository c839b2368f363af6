//! Account and session records.
//!
//! Every operation checks its required fields first, then runs inside exactly one
//! unit of work. Password comparison is not done here: [`UserService::lookup_user`]
//! hands the stored hash to the caller.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AppResult};
use crate::models::{Email, ExpiryTime, Session, SessionId, User, UserId};
use crate::store::{Store, StoreResult, UnitOfWork, USERS_EMAIL_KEY};
use crate::validate::{required, Field};

pub struct UserService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
    enforce_expiry: bool,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            enforce_expiry: false,
        }
    }

    /// When enabled, [`authenticate_session`](Self::authenticate_session) rejects
    /// sessions whose stored expiry has passed. Off by default: expiry is recorded
    /// but sessions never lapse.
    pub fn with_expiry_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_expiry = enforce;
        self
    }

    /// Registers a new account. Fails with `EmailExists` if the email is taken.
    pub async fn create_user(&self, email: &Email, password: &str) -> AppResult<()> {
        let email = Email::from(required(email.as_str(), Field::Email)?);
        required(password, Field::Password)?;

        let user = User {
            id: UserId::generate(),
            email,
            password_hash: self.hasher.hash(password)?,
        };

        let mut uow = self.store.begin().await?;
        match uow.insert_user(&user).await {
            Ok(()) => {}
            Err(err) if err.violates(USERS_EMAIL_KEY) => return Err(AppError::EmailExists),
            Err(err) => return Err(err.into()),
        }
        uow.commit().await?;

        info!("created user {}", user.id);
        Ok(())
    }

    /// Returns the id and password hash registered for `email`.
    pub async fn lookup_user(&self, email: &Email) -> AppResult<(UserId, String)> {
        let email = Email::from(required(email.as_str(), Field::Email)?);

        let mut uow = self.store.begin().await?;
        let user = uow.user_by_email(&email).await?;
        uow.commit().await?;

        let user = user.ok_or(AppError::NotFound("user"))?;
        Ok((user.id, user.password_hash))
    }

    /// Records a session. The caller generates the token and computes the expiry.
    pub async fn create_session(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        expiry_time: &ExpiryTime,
    ) -> AppResult<()> {
        let session = Session {
            session_id: SessionId::from(required(session_id.as_str(), Field::Session)?),
            user_id: UserId::from(required(user_id.as_str(), Field::UserId)?),
            expiry_time: ExpiryTime::from(required(expiry_time.as_str(), Field::ExpiryTime)?),
        };

        let mut uow = self.store.begin().await?;
        uow.insert_session(&session).await?;
        uow.commit().await?;

        debug!("opened session for user {}", session.user_id);
        Ok(())
    }

    /// Resolves a session token to the user that owns it.
    ///
    /// An empty token fails with a `Session` required error, an unknown one with
    /// `Unauthorized`. No other path may trust a session token.
    pub async fn authenticate_session(&self, session_id: &SessionId) -> AppResult<UserId> {
        let session_id = SessionId::from(required(session_id.as_str(), Field::Session)?);

        let mut uow = self.store.begin().await?;
        let session = uow.session(&session_id).await?;
        uow.commit().await?;

        let session = session.ok_or(AppError::Unauthorized)?;
        if self.enforce_expiry && session.expiry_time.has_passed(Utc::now()) {
            debug!("session for user {} has expired", session.user_id);
            return Err(AppError::Unauthorized);
        }
        Ok(session.user_id)
    }

    /// Deletes a session. Logging out twice is not an error.
    pub async fn logout_session(&self, session_id: &SessionId) -> AppResult<()> {
        let session_id = SessionId::from(required(session_id.as_str(), Field::Session)?);

        let mut uow = self.store.begin().await?;
        let removed = uow.delete_session(&session_id).await?;
        uow.commit().await?;

        debug!("logout removed {} session(s)", removed);
        Ok(())
    }

    /// Deletes the user together with all of their sessions and tasks, atomically.
    pub async fn delete_user(&self, user_id: &UserId) -> AppResult<()> {
        let user_id = UserId::from(required(user_id.as_str(), Field::UserId)?);

        let mut uow = self.store.begin().await?;
        if let Err(err) = delete_cascade(&mut *uow, &user_id).await {
            if let Err(rollback_err) = uow.rollback().await {
                warn!("rollback after failed delete of user {} failed: {}", user_id, rollback_err);
            }
            return Err(err.into());
        }
        uow.commit().await?;

        info!("deleted user {}", user_id);
        Ok(())
    }
}

async fn delete_cascade(uow: &mut dyn UnitOfWork, user_id: &UserId) -> StoreResult<()> {
    uow.delete_user(user_id).await?;
    let sessions = uow.delete_user_sessions(user_id).await?;
    let tasks = uow.delete_user_tasks(user_id).await?;
    debug!(
        "cascade for user {} removed {} session(s) and {} task(s)",
        user_id, sessions, tasks
    );
    Ok(())
}
