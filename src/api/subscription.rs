use std::collections::HashMap;

use actix_web::{delete, get, post, web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::{error::Error, service::Service, subscription::Subscription};

use super::{ListQuery, ListResponse};

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub queue_id: String,
    #[serde(default)]
    pub message_filters: HashMap<String, Vec<String>>,
}

#[post("")]
async fn create_subscription(
    service: web::Data<Service>,
    body: web::Json<CreateSubscriptionRequest>,
) -> Result<impl Responder, Error> {
    let body = body.into_inner();

    let subscription = Subscription::builder()
        .id(body.id)
        .topic_id(body.topic_id)
        .queue_id(body.queue_id)
        .message_filters(body.message_filters)
        .build();

    let subscription = service.subscriptions().create(subscription).await?;

    Ok(HttpResponse::Created().json(subscription))
}

#[get("/{subscription_id}")]
async fn get_subscription(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    Ok(web::Json(service.subscriptions().get(&path).await?))
}

#[get("")]
async fn list_subscriptions(
    service: web::Data<Service>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, Error> {
    let query = query.into_inner();
    let subscriptions = service
        .subscriptions()
        .list(query.offset, query.limit)
        .await?;

    Ok(web::Json(ListResponse::new(subscriptions, query)))
}

#[delete("/{subscription_id}")]
async fn delete_subscription(
    service: web::Data<Service>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    service.subscriptions().delete(&path).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn service() -> Scope {
    web::scope("/subscriptions")
        .service(create_subscription)
        .service(list_subscriptions)
        .service(get_subscription)
        .service(delete_subscription)
}
