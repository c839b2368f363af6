pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;

/// Registers shared state, `/health` and the gated `/api` tree.
///
/// Every `/api` route except user creation and login goes through
/// [`AuthMiddleware`].
pub fn app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::from(state.store))
            .app_data(web::Data::from(state.users))
            .app_data(web::Data::from(state.tasks))
            .app_data(web::Data::from(state.sessions.clone()))
            .app_data(web::Data::new(state.settings))
            .app_data(json_config())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(state.sessions))
                    .configure(config),
            );
    }
}

/// The `/users` and `/tasks` scopes, without state or gateway.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::create_user)
            .service(users::login)
            .service(users::logout)
            .service(users::delete_user),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::edit_task)
            .service(tasks::toggle_task)
            .service(tasks::toggle_all)
            .service(tasks::delete_task)
            .service(tasks::clear_completed),
    );
}

/// Undecodable bodies become `AppError::InvalidJson` instead of actix's default error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::InvalidJson(err.to_string()).into())
}
