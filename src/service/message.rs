use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db::{MessageRepository, QueueRepository},
    error::Error,
    message::Message,
    telemetry::{MESSAGES_ENQUEUED_TOTAL, MESSAGES_LEASED_TOTAL},
};

#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepository,
    queues: QueueRepository,
}

impl MessageService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            queues: QueueRepository::new(pool),
        }
    }

    /// Enqueues `message` on `queue_id` and returns it as stored.
    pub async fn create(&self, queue_id: &str, mut message: Message) -> Result<Message, Error> {
        message.validate()?;

        let queue = self.queues.get(queue_id).await?;
        message.enqueue(&queue, Utc::now());

        self.messages.create(&message).await?;
        metrics::counter!(MESSAGES_ENQUEUED_TOTAL, "queue_id" => queue.id).increment(1);

        Ok(message)
    }

    pub async fn get(&self, id: &str) -> Result<Message, Error> {
        self.messages.get(id).await
    }

    /// Leases up to `limit` visible messages of `queue_id`.
    pub async fn list(
        &self,
        queue_id: &str,
        label: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Message>, Error> {
        let queue = self.queues.get(queue_id).await?;
        let leased = self.messages.lease(&queue, label, limit, Utc::now()).await?;

        metrics::counter!(MESSAGES_LEASED_TOTAL, "queue_id" => queue.id)
            .increment(leased.len() as u64);

        Ok(leased)
    }

    pub async fn ack(&self, id: &str) -> Result<(), Error> {
        self.messages.ack(id, Utc::now()).await
    }

    pub async fn nack(&self, id: &str, visibility_timeout_seconds: u32) -> Result<(), Error> {
        self.messages
            .nack(id, visibility_timeout_seconds, Utc::now())
            .await
    }
}
