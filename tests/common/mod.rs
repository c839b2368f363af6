#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::{self, BoxBody, MessageBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, HttpResponse};
use serde_json::{json, Value};

use todo_api::auth::{Bcrypt, SESSION_COOKIE};
use todo_api::state::{AppState, SessionSettings};
use todo_api::store::MemoryStore;

/// Lowest cost bcrypt accepts.
pub const TEST_COST: u32 = 4;

pub fn state(store: &MemoryStore) -> AppState {
    AppState::new(
        Arc::new(store.clone()),
        Arc::new(Bcrypt::new(TEST_COST)),
        SessionSettings::default(),
    )
}

/// Builds the full application, gateway included, over `$store`.
#[allow(unused_macros)]
macro_rules! test_app {
    ($store:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(todo_api::routes::app(common::state(&$store))),
        )
        .await
    };
}

/// A response with its body decoded.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub cookies: Vec<Cookie<'static>>,
    pub body: Value,
}

impl Reply {
    pub fn session_cookie(&self) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|c| c.name() == SESSION_COOKIE)
    }

    pub fn info(&self) -> &str {
        self.body["info"].as_str().unwrap_or_default()
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Sends `req` and turns errors raised by middleware into responses, the way the
/// server would.
pub async fn send<S, B>(app: &S, req: Request) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let resp: HttpResponse<BoxBody> = match test::try_call_service(app, req).await {
        Ok(resp) => resp.into_parts().1.map_into_boxed_body(),
        Err(err) => err.error_response(),
    };

    let status = resp.status();
    let cookies = resp.cookies().map(|c| c.into_owned()).collect();
    let bytes = body::to_bytes(resp.into_body()).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        cookies,
        body,
    }
}

pub async fn create_user<S, B>(app: &S, email: &str, password: &str) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let req = test::TestRequest::post()
        .uri("/api/users/create")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

/// Registers `email` and logs in, returning the session cookie.
pub async fn sign_up<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let created = create_user(app, email, password).await;
    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let login = send(app, req).await;
    assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
    login
        .session_cookie()
        .cloned()
        .expect("login sets the session cookie")
}

pub async fn list_tasks<S, B>(app: &S, cookie: &Cookie<'static>) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .cookie(cookie.clone())
        .to_request();
    send(app, req).await
}

pub async fn post_json<S, B>(app: &S, uri: &str, cookie: &Cookie<'static>, body: Value) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    send(app, req).await
}

pub async fn delete<S, B>(app: &S, uri: &str, cookie: &Cookie<'static>) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let req = test::TestRequest::delete()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request();
    send(app, req).await
}
