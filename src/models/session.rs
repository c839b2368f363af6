use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::UserId;

string_id!(
    /// Opaque random token identifying a login session. Travels in the `session` cookie.
    SessionId
);

string_id!(
    /// Session expiry, stored as an RFC 3339 timestamp.
    ExpiryTime
);

impl SessionId {
    /// Generates a new session token from the operating system's random source.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ExpiryTime {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant.to_rfc3339())
    }

    /// Parses the stored value. Returns `None` if it is not an RFC 3339 timestamp.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.as_str().trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Whether the expiry lies before `now`. Unparseable values count as expired.
    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        self.instant().map_or(true, |expiry| expiry <= now)
    }
}

/// A login session binding a token to its owning user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub expiry_time: ExpiryTime,
}
