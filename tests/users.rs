#[macro_use]
mod common;

use actix_web::cookie::{time, Cookie};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::json;

use common::{create_user, delete, list_tasks, post_json, send, sign_up};
use todo_api::auth::SESSION_COOKIE;
use todo_api::models::{Email, UserId};
use todo_api::store::{MemoryStore, Statement};

#[actix_rt::test]
async fn test_create_user_and_duplicate_email() {
    let store = MemoryStore::new();
    let app = test_app!(store);

    let created = create_user(&app, "alice@x.com", "pw123").await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.info(), "User has been created with email: alice@x.com");

    let duplicate = create_user(&app, "alice@x.com", "other").await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error(), "email already exists");

    assert_eq!(store.snapshot().await.users_with_email("alice@x.com"), 1);
}

#[actix_rt::test]
async fn test_create_user_rejects_blank_fields() {
    let store = MemoryStore::new();
    let app = test_app!(store);

    let reply = create_user(&app, "   ", "pw123").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "email required");

    let reply = create_user(&app, "alice@x.com", "").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "password required");

    assert!(store.snapshot().await.users.is_empty());
}

#[actix_rt::test]
async fn test_invalid_json_is_a_bad_request() {
    let store = MemoryStore::new();
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/users/create")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "invalid json");
}

#[actix_rt::test]
async fn test_login_sets_session_cookie() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    create_user(&app, "alice@x.com", "pw123").await;

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": "alice@x.com", "password": "pw123" }))
        .to_request();
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.info(), "Login successful");

    let cookie = reply.session_cookie().unwrap();
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::days(14)));

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.sessions.len(), 1);
    assert_eq!(snapshot.sessions[0].session_id.as_str(), cookie.value());
}

#[actix_rt::test]
async fn test_login_failures_do_not_reveal_registered_emails() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    create_user(&app, "alice@x.com", "pw123").await;

    for (email, password) in [("alice@x.com", "wrong"), ("bob@x.com", "pw123")] {
        let req = test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let reply = send(&app, req).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.error(), "invalid email or password");
        assert!(reply.session_cookie().is_none());
    }
    assert!(store.snapshot().await.sessions.is_empty());
}

#[actix_rt::test]
async fn test_logout_clears_cookie_and_session() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    let cookie = sign_up(&app, "alice@x.com", "pw123").await;

    let reply = delete(&app, "/api/users/logout", &cookie).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.info(), "Succesfully logged out");
    let removal = reply.session_cookie().unwrap();
    assert_eq!(removal.value(), "");
    assert_eq!(removal.max_age(), Some(time::Duration::ZERO));

    assert!(store.snapshot().await.sessions.is_empty());
    assert_eq!(list_tasks(&app, &cookie).await.status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_logout_requires_a_session() {
    let store = MemoryStore::new();
    let app = test_app!(store);

    let req = test::TestRequest::delete()
        .uri("/api/users/logout")
        .to_request();
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "user is not authorized");
}

#[actix_rt::test]
async fn test_delete_user_removes_everything_they_own() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    let alice = sign_up(&app, "alice@x.com", "pw123").await;
    let bob = sign_up(&app, "bob@x.com", "pw456").await;
    post_json(&app, "/api/tasks/create", &alice, json!({ "content": "alice's" })).await;
    post_json(&app, "/api/tasks/create", &bob, json!({ "content": "bob's" })).await;

    let reply = delete(&app, "/api/users/delete", &alice).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.info(), "User deleted successfully");
    assert_eq!(reply.session_cookie().unwrap().value(), "");

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.users_with_email("alice@x.com"), 0);
    assert_eq!(snapshot.users_with_email("bob@x.com"), 1);
    assert_eq!(snapshot.sessions.len(), 1);
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].content, "bob's");

    assert_eq!(list_tasks(&app, &alice).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(list_tasks(&app, &bob).await.status, StatusCode::OK);

    // the email can be registered again
    assert_eq!(create_user(&app, "alice@x.com", "new").await.status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_failed_delete_keeps_the_account_intact() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    let cookie = sign_up(&app, "alice@x.com", "pw123").await;
    post_json(&app, "/api/tasks/create", &cookie, json!({ "content": "keep me" })).await;

    let failing = store.fail_on(Statement::DeleteUserTasks);
    let failing_app = test_app!(failing);
    let reply = delete(&failing_app, "/api/users/delete", &cookie).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "internal error");
    assert!(reply.session_cookie().is_none());

    let snapshot = store.snapshot().await;
    let owner = snapshot.users[0].id.clone();
    assert_eq!(snapshot.users_with_email("alice@x.com"), 1);
    assert_eq!(snapshot.sessions_of(&owner), 1);
    assert_eq!(snapshot.tasks_of(&owner), 1);
    assert_eq!(list_tasks(&app, &cookie).await.status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_unknown_session_cookie_is_rejected() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    sign_up(&app, "alice@x.com", "pw123").await;

    let forged = Cookie::new(SESSION_COOKIE, "forged-token");
    let reply = list_tasks(&app, &forged).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_session_resolves_to_its_own_user() {
    let store = MemoryStore::new();
    let app = test_app!(store);
    let alice = sign_up(&app, "alice@x.com", "pw123").await;

    let snapshot = store.snapshot().await;
    let session = &snapshot.sessions[0];
    let user = snapshot
        .users
        .iter()
        .find(|u| u.email == Email::from("alice@x.com"))
        .unwrap();
    assert_eq!(session.session_id.as_str(), alice.value());
    assert_eq!(session.user_id, user.id);
    assert_ne!(session.user_id, UserId::default());
}
