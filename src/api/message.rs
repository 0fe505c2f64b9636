use std::collections::HashMap;

use actix_web::{get, post, put, web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::{error::Error, message::Message, service::Service};

use super::ListResponse;

const DEFAULT_LEASE_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl From<CreateMessageRequest> for Message {
    fn from(request: CreateMessageRequest) -> Self {
        Message::builder()
            .body(request.body)
            .maybe_label(request.label)
            .attributes(request.attributes)
            .build()
    }
}

#[derive(Debug, Deserialize)]
pub struct LeaseQuery {
    pub label: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NackQuery {
    #[serde(default)]
    pub visibility_timeout_seconds: u32,
}

#[post("")]
async fn create_message(
    service: web::Data<Service>,
    path: web::Path<String>,
    body: web::Json<CreateMessageRequest>,
) -> Result<impl Responder, Error> {
    let message = service
        .messages()
        .create(&path, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(message))
}

/// Leases visible messages. The requested limit, 10 when absent, is capped
/// by `queue_max_number_of_messages`.
#[get("")]
async fn lease_messages(
    service: web::Data<Service>,
    path: web::Path<String>,
    query: web::Query<LeaseQuery>,
) -> Result<impl Responder, Error> {
    let max = service.config().queue_max_number_of_messages();
    let limit = query.limit.unwrap_or(DEFAULT_LEASE_LIMIT).min(max);

    let messages = service
        .messages()
        .list(&path, query.label.as_deref(), limit)
        .await?;

    Ok(web::Json(ListResponse {
        data: messages,
        offset: 0,
        limit,
    }))
}

#[put("/{message_id}/ack")]
async fn ack_message(
    service: web::Data<Service>,
    path: web::Path<(String, String)>,
) -> Result<impl Responder, Error> {
    let (_queue_id, message_id) = &*path;
    service.messages().ack(message_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[put("/{message_id}/nack")]
async fn nack_message(
    service: web::Data<Service>,
    path: web::Path<(String, String)>,
    query: web::Query<NackQuery>,
) -> Result<impl Responder, Error> {
    let (_queue_id, message_id) = &*path;
    service
        .messages()
        .nack(message_id, query.visibility_timeout_seconds)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn service() -> Scope {
    web::scope("/queues/{queue_id}/messages")
        .service(create_message)
        .service(lease_messages)
        .service(ack_message)
        .service(nack_message)
}
