use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::{SessionId, UserId};

/// The identity `AuthMiddleware` resolved for the current request.
///
/// Handlers behind the gateway take this as an argument to learn who is
/// calling. If the middleware did not run, extraction fails with
/// `AppError::Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::Unauthorized.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthenticatedUser {
            user_id: UserId::from("u1"),
            session_id: SessionId::from("s1"),
        });

        let mut payload = Payload::None;
        let user = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(user.user_id, UserId::from("u1"));
        assert_eq!(user.session_id, SessionId::from("s1"));
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
