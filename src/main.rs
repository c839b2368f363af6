use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, App, HttpServer};
use log::{error, info};

use todo_api::auth::{Bcrypt, PasswordHasher};
use todo_api::config::Config;
use todo_api::routes;
use todo_api::state::AppState;
use todo_api::store::{PgStore, Store};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let store = match PgStore::connect(&config.database_url, config.database_max_connections).await
    {
        Ok(store) => store,
        Err(err) => {
            error!("failed to connect to database: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = store.provision().await {
        error!("failed to provision schema: {}", err);
        std::process::exit(1);
    }

    let store: Arc<dyn Store> = Arc::new(store);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Bcrypt::new(config.bcrypt_cost));
    let settings = match config.session_settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    let state = AppState::new(store, hasher, settings);

    info!("Starting todo-api server at {}", config.server_url());
    let origin = config.cors_allowed_origin.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allowed_origin(&origin)
                    .allowed_methods(vec!["GET", "POST", "OPTIONS", "PUT", "PATCH", "DELETE"])
                    .allowed_header(header::CONTENT_TYPE)
                    .supports_credentials()
                    .max_age(3600),
            )
            .configure(routes::app(state.clone()))
    })
    .client_request_timeout(CLIENT_TIMEOUT)
    .client_disconnect_timeout(CLIENT_TIMEOUT)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
