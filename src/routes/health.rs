use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::error;
use serde_json::json;

use crate::store::Store;

/// Health check endpoint
///
/// Opens and commits an empty unit of work to confirm storage is reachable.
/// Answers `503 Service Unavailable` when it is not.
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> impl Responder {
    let reachable = match store.begin().await {
        Ok(uow) => uow.commit().await,
        Err(err) => Err(err),
    };

    match reachable {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "timestamp": Utc::now()
        })),
        Err(err) => {
            error!("health check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
