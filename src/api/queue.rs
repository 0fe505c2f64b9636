use actix_web::{delete, get, post, put, web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::{error::Error, queue::Queue, service::Service};

use super::{ListQuery, ListResponse};

#[derive(Debug, Deserialize)]
pub struct CreateQueueRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub ack_deadline_seconds: u32,
    #[serde(default)]
    pub message_retention_seconds: u32,
    #[serde(default)]
    pub delivery_delay_seconds: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQueueRequest {
    #[serde(default)]
    pub ack_deadline_seconds: u32,
    #[serde(default)]
    pub message_retention_seconds: u32,
    #[serde(default)]
    pub delivery_delay_seconds: u32,
}

#[post("")]
async fn create_queue(
    service: web::Data<Service>,
    body: web::Json<CreateQueueRequest>,
) -> Result<impl Responder, Error> {
    let body = body.into_inner();

    let queue = Queue::builder()
        .id(body.id)
        .ack_deadline_seconds(body.ack_deadline_seconds)
        .message_retention_seconds(body.message_retention_seconds)
        .delivery_delay_seconds(body.delivery_delay_seconds)
        .build();

    let queue = service.queues().create(queue).await?;

    Ok(HttpResponse::Created().json(queue))
}

#[put("/{queue_id}")]
async fn update_queue(
    service: web::Data<Service>,
    path: web::Path<String>,
    body: web::Json<UpdateQueueRequest>,
) -> Result<impl Responder, Error> {
    let queue = Queue::builder()
        .id(path.into_inner())
        .ack_deadline_seconds(body.ack_deadline_seconds)
        .message_retention_seconds(body.message_retention_seconds)
        .delivery_delay_seconds(body.delivery_delay_seconds)
        .build();

    let queue = service.queues().update(queue).await?;

    Ok(web::Json(queue))
}

#[get("/{queue_id}")]
async fn get_queue(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    Ok(web::Json(service.queues().get(&path).await?))
}

#[get("")]
async fn list_queues(
    service: web::Data<Service>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, Error> {
    let query = query.into_inner();
    let queues = service.queues().list(query.offset, query.limit).await?;

    Ok(web::Json(ListResponse::new(queues, query)))
}

#[delete("/{queue_id}")]
async fn delete_queue(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    service.queues().delete(&path).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/{queue_id}/stats")]
async fn queue_stats(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    Ok(web::Json(service.queues().stats(&path).await?))
}

#[put("/{queue_id}/purge")]
async fn purge_queue(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    service.queues().purge(&path).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[put("/{queue_id}/cleanup")]
async fn cleanup_queue(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    service.queues().cleanup(&path).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn service() -> Scope {
    web::scope("/queues")
        .service(create_queue)
        .service(list_queues)
        .service(queue_stats)
        .service(purge_queue)
        .service(cleanup_queue)
        .service(update_queue)
        .service(get_queue)
        .service(delete_queue)
}
