use actix_web::{get, web, HttpResponse, Responder};

use crate::{error::Error, service::Service};

/// Liveness probe backed by a round trip to the database.
#[get("/healthz")]
pub async fn healthz(service: web::Data<Service>) -> Result<impl Responder, Error> {
    let check = service.health().check().await?;

    let response = if check.success {
        HttpResponse::Ok().json(check)
    } else {
        HttpResponse::ServiceUnavailable().json(check)
    };

    Ok(response)
}
