use actix_web::{
    web::{self, JsonConfig, PathConfig, QueryConfig},
    Scope,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod health;
pub mod message;
pub mod queue;
pub mod subscription;
pub mod topic;

const DEFAULT_LIST_LIMIT: u32 = 1;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_list_limit")]
    pub limit: u32,
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

/// One page of a listing, echoing the window that produced it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub offset: u32,
    pub limit: u32,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, query: ListQuery) -> Self {
        Self {
            data,
            offset: query.offset,
            limit: query.limit,
        }
    }
}

/// Body extraction settings: any content type is accepted, and undecodable
/// bodies surface as [`Error::MalformedRequest`].
pub fn json_config() -> JsonConfig {
    JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| Error::malformed(err.to_string()).into())
}

pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _req| Error::malformed(err.to_string()).into())
}

pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|err, _req| Error::malformed(err.to_string()).into())
}

/// All versioned routes.
pub fn service() -> Scope {
    // Message routes live under `/queues/{queue_id}/messages` and must be
    // registered before the queue scope, which would otherwise claim them.
    web::scope("/v1")
        .service(message::service())
        .service(queue::service())
        .service(topic::service())
        .service(subscription::service())
}
