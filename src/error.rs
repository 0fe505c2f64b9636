use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::validation::ValidationErrors;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Entity {
    Queue,
    Message,
    Topic,
    Subscription,
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("request validation failed: {errors}"))]
    ValidationFailed { errors: ValidationErrors },

    #[snafu(display("{entity} not found: {id}"))]
    NotFound { entity: Entity, id: String },

    #[snafu(display("{entity} already exists: {id}"))]
    AlreadyExists { entity: Entity, id: String },

    #[snafu(display("Storage unavailable"))]
    StorageUnavailable {
        #[snafu(source)]
        source: sqlx::Error,
    },

    #[snafu(display("Error returned from database"))]
    Unknown {
        #[snafu(source)]
        source: sqlx::Error,
    },

    #[snafu(display("Error running migrations"))]
    Migration {
        #[snafu(source)]
        source: sqlx::migrate::MigrateError,
    },

    #[snafu(display("Malformed request: {message}"))]
    MalformedRequest { message: String },
}

impl From<sqlx::Error> for Error {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::StorageUnavailable { source },
            source => {
                tracing::error!(error = %source, "unexpected storage failure");
                Self::Unknown { source }
            }
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(source: sqlx::migrate::MigrateError) -> Self {
        Self::Migration { source }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed { errors }
    }
}

impl Error {
    /// Translates a storage failure on a single record into the domain taxonomy.
    ///
    /// Missing rows become [`Error::NotFound`] and duplicate keys become
    /// [`Error::AlreadyExists`] for `entity`; anything else is classified by the
    /// [`From<sqlx::Error>`] conversion.
    pub fn from_storage(source: sqlx::Error, entity: Entity, id: impl Into<String>) -> Self {
        match &source {
            sqlx::Error::RowNotFound => Self::not_found(entity, id),
            sqlx::Error::Database(e)
                if e.is_unique_violation() || e.message().starts_with("UNIQUE constraint") =>
            {
                Self::AlreadyExists {
                    entity,
                    id: id.into(),
                }
            }
            _ => Self::from(source),
        }
    }

    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn queue_not_found(id: impl Into<String>) -> Self {
        Self::not_found(Entity::Queue, id)
    }

    pub fn message_not_found(id: impl Into<String>) -> Self {
        Self::not_found(Entity::Message, id)
    }

    pub fn topic_not_found(id: impl Into<String>) -> Self {
        Self::not_found(Entity::Topic, id)
    }

    pub fn subscription_not_found(id: impl Into<String>) -> Self {
        Self::not_found(Entity::Subscription, id)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Stable numeric code exposed to API clients.
    pub fn code(&self) -> u16 {
        match self {
            Self::Unknown { .. } | Self::Migration { .. } => 1,
            Self::MalformedRequest { .. } => 2,
            Self::ValidationFailed { .. } => 3,
            Self::AlreadyExists { entity, .. } => match entity {
                Entity::Queue => 4,
                Entity::Topic => 7,
                Entity::Subscription => 9,
                Entity::Message => 11,
            },
            Self::NotFound { entity, .. } => match entity {
                Entity::Queue => 5,
                Entity::Message => 6,
                Entity::Topic => 8,
                Entity::Subscription => 10,
            },
            Self::StorageUnavailable { .. } => 12,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unknown { .. } | Self::Migration { .. } => "internal server error".to_owned(),
            Self::MalformedRequest { .. } => "malformed request body".to_owned(),
            Self::ValidationFailed { .. } => "request validation failed".to_owned(),
            Self::AlreadyExists { entity, .. } => format!("{entity} already exists"),
            Self::NotFound { entity, .. } => format!("{entity} not found"),
            Self::StorageUnavailable { .. } => "storage unavailable".to_owned(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::ValidationFailed { errors } => serde_json::to_value(errors).ok(),
            Self::MalformedRequest { message } => Some(serde_json::Value::String(message.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            Self::ValidationFailed { .. }
            | Self::AlreadyExists { .. }
            | Self::MalformedRequest { .. } => StatusCode::BAD_REQUEST,

            Self::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,

            Self::Unknown { .. } | Self::Migration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            code: self.code(),
            message: self.public_message(),
            details: self.details(),
        })
    }
}
