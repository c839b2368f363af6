pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{Bcrypt, PasswordHasher};
pub use session::{removal_cookie, session_cookie, IssuedSession, SessionAuthenticator, SESSION_COOKIE};
