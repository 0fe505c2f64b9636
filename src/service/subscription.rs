use chrono::Utc;
use sqlx::SqlitePool;

use crate::{db::SubscriptionRepository, error::Error, subscription::Subscription};

#[derive(Clone)]
pub struct SubscriptionService {
    subscriptions: SubscriptionRepository,
}

impl SubscriptionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(pool),
        }
    }

    pub async fn create(&self, mut subscription: Subscription) -> Result<Subscription, Error> {
        subscription.validate()?;

        subscription.created_at = Utc::now();

        self.subscriptions.create(&subscription).await?;

        Ok(subscription)
    }

    pub async fn get(&self, id: &str) -> Result<Subscription, Error> {
        self.subscriptions.get(id).await
    }

    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Subscription>, Error> {
        self.subscriptions.list(offset, limit).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let subscription = self.subscriptions.get(id).await?;
        self.subscriptions.delete(&subscription.id).await
    }
}
