use crate::{
    auth::{removal_cookie, session_cookie, AuthenticatedUser, SessionAuthenticator},
    error::AppError,
    models::{CreateUserRequest, Email, InfoResponse, LoginRequest},
    services::UserService,
    state::SessionSettings,
};
use actix_web::{delete, post, web, HttpResponse, Responder};

/// Register a new user
///
/// ## Responses:
/// - `200 OK`: the account was created.
/// - `400 Bad Request`: email or password missing, or the body is not valid JSON.
/// - `409 Conflict`: the email is already registered.
#[post("/create")]
pub async fn create_user(
    users: web::Data<UserService>,
    user_data: web::Json<CreateUserRequest>,
) -> Result<impl Responder, AppError> {
    let CreateUserRequest { email, password } = user_data.into_inner();
    let email = Email::from(email.trim());
    users.create_user(&email, &password).await?;

    Ok(HttpResponse::Ok().json(InfoResponse::new(format!(
        "User has been created with email: {}",
        email
    ))))
}

/// Login user
///
/// Checks the credentials and sets the `session` cookie.
///
/// ## Responses:
/// - `200 OK`: the session cookie is set.
/// - `400 Bad Request`: email or password missing.
/// - `401 Unauthorized`: unknown email or wrong password.
#[post("/login")]
pub async fn login(
    sessions: web::Data<SessionAuthenticator>,
    settings: web::Data<SessionSettings>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let LoginRequest { email, password } = login_data.into_inner();
    let issued = sessions.login(&Email::from(email), &password).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&issued, sessions.ttl(), settings.cookie_secure))
        .json(InfoResponse::new("Login successful")))
}

/// Ends the caller's session and clears the cookie.
#[delete("/logout")]
pub async fn logout(
    sessions: web::Data<SessionAuthenticator>,
    settings: web::Data<SessionSettings>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    sessions.logout(&user.session_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(settings.cookie_secure))
        .json(InfoResponse::new("Succesfully logged out")))
}

/// Deletes the caller's account with all of its sessions and tasks.
#[delete("/delete")]
pub async fn delete_user(
    users: web::Data<UserService>,
    settings: web::Data<SessionSettings>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    users.delete_user(&user.user_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(settings.cookie_secure))
        .json(InfoResponse::new("User deleted successfully")))
}
