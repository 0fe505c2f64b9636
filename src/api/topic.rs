use actix_web::{delete, get, post, web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::{error::Error, service::Service, topic::Topic};

use super::{message::CreateMessageRequest, ListQuery, ListResponse};

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    #[serde(default)]
    pub id: String,
}

#[post("")]
async fn create_topic(
    service: web::Data<Service>,
    body: web::Json<CreateTopicRequest>,
) -> Result<impl Responder, Error> {
    let topic = service
        .topics()
        .create(Topic::new(body.into_inner().id))
        .await?;

    Ok(HttpResponse::Created().json(topic))
}

#[get("/{topic_id}")]
async fn get_topic(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    Ok(web::Json(service.topics().get(&path).await?))
}

#[get("")]
async fn list_topics(
    service: web::Data<Service>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, Error> {
    let query = query.into_inner();
    let topics = service.topics().list(query.offset, query.limit).await?;

    Ok(web::Json(ListResponse::new(topics, query)))
}

#[delete("/{topic_id}")]
async fn delete_topic(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    service.topics().delete(&path).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Publishes a message and answers with the copies routed to subscribed queues.
#[post("/{topic_id}/messages")]
async fn publish_message(
    service: web::Data<Service>,
    path: web::Path<String>,
    body: web::Json<CreateMessageRequest>,
) -> Result<impl Responder, Error> {
    let messages = service
        .topics()
        .create_message(&path, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(messages))
}

pub fn service() -> Scope {
    web::scope("/topics")
        .service(create_topic)
        .service(list_topics)
        .service(publish_message)
        .service(get_topic)
        .service(delete_topic)
}
