//! Message storage and the lease protocol.
//!
//! SQLite has no `SELECT ... FOR UPDATE SKIP LOCKED`, so a lease claims rows
//! with a compare-and-swap instead:
//!
//! 1. Read up to `limit` visible candidates, oldest-due first.
//! 2. Open a write transaction and, for each candidate, apply
//!    [`Message::lease_renew`] through an `UPDATE` whose predicate repeats the
//!    visibility window and the `delivery_attempts` value that was read.
//! 3. Commit.
//!
//! SQLite admits one writer at a time, and the first statement of the
//! transaction is a write, so each claim is evaluated against the latest
//! committed state. A candidate that a concurrent lease already renewed (or
//! that was acked, nacked or expired in the meantime) no longer satisfies the
//! predicate. It is skipped and the caller gets fewer rows. All renewals of
//! one lease commit together, and dropping the future before the commit rolls
//! every one of them back.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, SqliteConnection, SqlitePool};

use super::VISIBLE;
use crate::{
    error::{Entity, Error},
    message::Message,
    queue::Queue,
};

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert(db: &mut SqliteConnection, message: &Message) -> Result<(), Error> {
        sqlx::query(
            "
            INSERT INTO messages (
                id, queue_id, label, body, attributes, delivery_attempts,
                expired_at, scheduled_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(&message.id)
        .bind(&message.queue_id)
        .bind(&message.label)
        .bind(&message.body)
        .bind(Json(&message.attributes))
        .bind(message.delivery_attempts)
        .bind(message.expired_at)
        .bind(message.scheduled_at)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(db)
        .await
        .map_err(|e| Error::from_storage(e, Entity::Message, &message.id))?;

        Ok(())
    }

    async fn update(&self, message: &Message) -> Result<(), Error> {
        let result = sqlx::query(
            "
            UPDATE messages
            SET delivery_attempts = $2, expired_at = $3, scheduled_at = $4, updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(&message.id)
        .bind(message.delivery_attempts)
        .bind(message.expired_at)
        .bind(message.scheduled_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from_storage(e, Entity::Message, &message.id))?;

        if result.rows_affected() == 0 {
            return Err(Error::message_not_found(&message.id));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, fields(message_id = %message.id, queue_id = %message.queue_id))]
    pub async fn create(&self, message: &Message) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, message).await
    }

    /// Inserts `messages` in a single transaction: either all of them become
    /// visible or none do.
    #[tracing::instrument(skip_all, fields(count = messages.len()))]
    pub async fn create_many(&self, messages: &[Message]) -> Result<(), Error> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for message in messages {
            if let Err(e) = Self::insert(&mut tx, message).await {
                super::rollback(tx).await;
                return Err(e);
            }
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Message, Error> {
        sqlx::query_as("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from_storage(e, Entity::Message, id))
    }

    /// Claims up to `limit` messages of `queue` that are visible at `now`,
    /// optionally restricted to `label`, and leases each of them for the
    /// queue's ack deadline.
    ///
    /// Concurrent leases on the same queue never return the same message.
    #[tracing::instrument(skip_all, fields(queue_id = %queue.id, label = ?label, limit = limit))]
    pub async fn lease(
        &self,
        queue: &Queue,
        label: Option<&str>,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Message>, Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let select = format!(
            "
            SELECT * FROM messages
            WHERE queue_id = $1
              AND {VISIBLE}
              AND ($3 IS NULL OR label = $3)
            ORDER BY scheduled_at ASC, id ASC
            LIMIT $4
            "
        );
        let claim = format!(
            "
            UPDATE messages
            SET delivery_attempts = $3, scheduled_at = $4, updated_at = $5
            WHERE id = $1
              AND delivery_attempts = $6
              AND {VISIBLE}
            "
        );

        let candidates: Vec<Message> = sqlx::query_as(&select)
            .bind(&queue.id)
            .bind(now)
            .bind(label)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        if candidates.is_empty() {
            return Ok(candidates);
        }

        let mut tx = self.pool.begin().await?;
        let mut leased = Vec::with_capacity(candidates.len());

        for mut message in candidates {
            let observed_attempts = message.delivery_attempts;
            message.lease_renew(queue, now);

            let claimed = sqlx::query(&claim)
                .bind(&message.id)
                .bind(now)
                .bind(message.delivery_attempts)
                .bind(message.scheduled_at)
                .bind(message.updated_at)
                .bind(observed_attempts)
                .execute(&mut *tx)
                .await;

            match claimed {
                Ok(result) if result.rows_affected() == 1 => leased.push(message),
                Ok(_) => {
                    tracing::debug!(message_id = %message.id, "message claimed concurrently, skipping");
                }
                Err(e) => {
                    super::rollback(tx).await;
                    return Err(e.into());
                }
            }
        }

        tx.commit().await?;

        tracing::debug!(leased = leased.len(), "lease granted");

        Ok(leased)
    }

    #[tracing::instrument(skip(self))]
    pub async fn ack(&self, id: &str, now: DateTime<Utc>) -> Result<(), Error> {
        let mut message = self.get(id).await?;
        message.ack(now);
        self.update(&message).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn nack(
        &self,
        id: &str,
        visibility_timeout_seconds: u32,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut message = self.get(id).await?;
        message.nack(now, visibility_timeout_seconds);
        self.update(&message).await
    }
}
