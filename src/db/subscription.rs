use sqlx::{types::Json, SqlitePool};

use crate::{
    error::{Entity, Error},
    subscription::Subscription,
};

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: SqlitePool,
}

impl SubscriptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip_all, fields(subscription_id = %subscription.id))]
    pub async fn create(&self, subscription: &Subscription) -> Result<(), Error> {
        sqlx::query(
            "
            INSERT INTO subscriptions (id, topic_id, queue_id, message_filters, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&subscription.id)
        .bind(&subscription.topic_id)
        .bind(&subscription.queue_id)
        .bind(Json(&subscription.message_filters))
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_storage(e, Entity::Subscription, &subscription.id))?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Subscription, Error> {
        sqlx::query_as("SELECT * FROM subscriptions WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Subscription, id))
    }

    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Subscription>, Error> {
        let (offset, limit) = super::page(offset, limit);

        Ok(
            sqlx::query_as("SELECT * FROM subscriptions ORDER BY id ASC LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// One page of the subscriptions attached to `topic_id`, ordered by id.
    pub async fn list_by_topic(
        &self,
        topic_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Subscription>, Error> {
        let (offset, limit) = super::page(offset, limit);

        Ok(sqlx::query_as(
            "
            SELECT * FROM subscriptions
            WHERE topic_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(topic_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Subscription, id))?;

        if result.rows_affected() == 0 {
            return Err(Error::subscription_not_found(id));
        }

        Ok(())
    }
}
