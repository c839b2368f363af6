use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, error};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::session::{SessionAuthenticator, SESSION_COOKIE};
use crate::error::{AppError, ErrorKind};
use crate::models::SessionId;

/// Paths that are served without a session: account creation and login.
pub const PUBLIC_PATHS: &[&str] = &["/api/users/create", "/api/users/login"];

/// Requires a valid session on every request except [`PUBLIC_PATHS`].
///
/// The token is read from the `session` cookie and resolved through the
/// [`SessionAuthenticator`]. On success the resolved identity is stored in the
/// request extensions as an [`AuthenticatedUser`]; otherwise the request is
/// rejected with `401 Unauthorized` before any handler runs.
pub struct AuthMiddleware {
    sessions: Arc<SessionAuthenticator>,
}

impl AuthMiddleware {
    pub fn new(sessions: Arc<SessionAuthenticator>) -> Self {
        Self { sessions }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            sessions: Arc::clone(&self.sessions),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    sessions: Arc<SessionAuthenticator>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = match req.cookie(SESSION_COOKIE) {
            Some(cookie) => SessionId::from(cookie.value()),
            None => {
                debug!("no session cookie on {}", req.path());
                return Box::pin(async move { Err(AppError::Unauthorized.into()) });
            }
        };

        let service = Rc::clone(&self.service);
        let sessions = Arc::clone(&self.sessions);
        Box::pin(async move {
            let user_id = match sessions.authenticate(&token).await {
                Ok(user_id) => user_id,
                Err(err) => {
                    if err.kind() == ErrorKind::Internal {
                        error!("session lookup failed: {:?}", err);
                    } else {
                        debug!("session rejected on {}: {}", req.path(), err);
                    }
                    return Err(AppError::Unauthorized.into());
                }
            };

            req.extensions_mut().insert(AuthenticatedUser {
                user_id,
                session_id: token,
            });
            service.call(req).await
        })
    }
}
