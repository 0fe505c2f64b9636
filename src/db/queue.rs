use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{EXPIRED, VISIBLE};
use crate::{
    error::{Entity, Error},
    queue::{Queue, QueueStats},
};

#[derive(Clone)]
pub struct QueueRepository {
    pool: SqlitePool,
}

impl QueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip_all, fields(queue_id = %queue.id))]
    pub async fn create(&self, queue: &Queue) -> Result<(), Error> {
        sqlx::query(
            "
            INSERT INTO queues (
                id, ack_deadline_seconds, message_retention_seconds,
                delivery_delay_seconds, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&queue.id)
        .bind(queue.ack_deadline_seconds)
        .bind(queue.message_retention_seconds)
        .bind(queue.delivery_delay_seconds)
        .bind(queue.created_at)
        .bind(queue.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_storage(e, Entity::Queue, &queue.id))?;

        Ok(())
    }

    #[tracing::instrument(skip_all, fields(queue_id = %queue.id))]
    pub async fn update(&self, queue: &Queue) -> Result<(), Error> {
        let result = sqlx::query(
            "
            UPDATE queues
            SET ack_deadline_seconds = $2,
                message_retention_seconds = $3,
                delivery_delay_seconds = $4,
                created_at = $5,
                updated_at = $6
            WHERE id = $1
            ",
        )
        .bind(&queue.id)
        .bind(queue.ack_deadline_seconds)
        .bind(queue.message_retention_seconds)
        .bind(queue.delivery_delay_seconds)
        .bind(queue.created_at)
        .bind(queue.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_storage(e, Entity::Queue, &queue.id))?;

        if result.rows_affected() == 0 {
            return Err(Error::queue_not_found(&queue.id));
        }

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Queue, Error> {
        sqlx::query_as("SELECT * FROM queues WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Queue, id))
    }

    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Queue>, Error> {
        let (offset, limit) = super::page(offset, limit);

        Ok(
            sqlx::query_as("SELECT * FROM queues ORDER BY id ASC LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Deletes the queue row only. Its messages are left in place.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM queues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Queue, id))?;

        if result.rows_affected() == 0 {
            return Err(Error::queue_not_found(id));
        }

        Ok(())
    }

    /// Counts the messages deliverable at `now` and the age of the oldest one.
    #[tracing::instrument(skip(self))]
    pub async fn stats(&self, id: &str, now: DateTime<Utc>) -> Result<QueueStats, Error> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM messages WHERE queue_id = $1 AND {VISIBLE}"
        ))
        .bind(id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        if count == 0 {
            return Ok(QueueStats::default());
        }

        let oldest: Option<DateTime<Utc>> = sqlx::query_scalar(&format!(
            "
            SELECT created_at FROM messages
            WHERE queue_id = $1 AND {VISIBLE}
            ORDER BY created_at ASC
            LIMIT 1
            "
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(QueueStats {
            num_undelivered_messages: count.unsigned_abs(),
            oldest_unacked_message_age_seconds: oldest
                .map(|created_at| (now - created_at).num_seconds().max(0).unsigned_abs())
                .unwrap_or(0),
        })
    }

    /// Deletes every message of the queue, whatever its state.
    #[tracing::instrument(skip(self))]
    pub async fn purge(&self, id: &str) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM messages WHERE queue_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes the messages of the queue that expired at or before `now`.
    #[tracing::instrument(skip(self))]
    pub async fn cleanup(&self, id: &str, now: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(&format!(
            "DELETE FROM messages WHERE queue_id = $1 AND {EXPIRED}"
        ))
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
