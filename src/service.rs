use sqlx::SqlitePool;

use crate::{config::Config, db, error::Error};

pub mod health;
pub mod message;
pub mod queue;
pub mod subscription;
pub mod topic;

pub use health::HealthCheckService;
pub use message::MessageService;
pub use queue::QueueService;
pub use subscription::SubscriptionService;
pub use topic::TopicService;

/// Owns the database pool and hands out the per-entity services.
///
/// Services hold no state of their own beyond pool handles, so any number of
/// `Service` instances (in one process or many) can share a database.
pub struct Service {
    db: SqlitePool,
    config: Config,
    queues: QueueService,
    messages: MessageService,
    topics: TopicService,
    subscriptions: SubscriptionService,
    health: HealthCheckService,
}

#[bon::bon]
impl Service {
    pub async fn connect() -> Result<Self, Error> {
        Self::connect_with().config(Config::default()).call().await
    }

    #[builder]
    pub async fn connect_with(config: Config) -> Result<Self, Error> {
        let pool = db::connect(&config).await?;

        Ok(Self::from_pool(pool, config))
    }

    /// Wraps an already migrated pool.
    pub fn from_pool(pool: SqlitePool, config: Config) -> Self {
        Self {
            queues: QueueService::new(pool.clone()),
            messages: MessageService::new(pool.clone()),
            topics: TopicService::new(pool.clone()),
            subscriptions: SubscriptionService::new(pool.clone()),
            health: HealthCheckService::new(pool.clone()),
            db: pool,
            config,
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn queues(&self) -> &QueueService {
        &self.queues
    }

    pub fn messages(&self) -> &MessageService {
        &self.messages
    }

    pub fn topics(&self) -> &TopicService {
        &self.topics
    }

    pub fn subscriptions(&self) -> &SubscriptionService {
        &self.subscriptions
    }

    pub fn health(&self) -> &HealthCheckService {
        &self.health
    }
}
