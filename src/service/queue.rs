use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db::QueueRepository,
    error::Error,
    queue::{Queue, QueueStats},
};

#[derive(Clone)]
pub struct QueueService {
    queues: QueueRepository,
}

impl QueueService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            queues: QueueRepository::new(pool),
        }
    }

    pub async fn create(&self, mut queue: Queue) -> Result<Queue, Error> {
        queue.validate()?;

        let now = Utc::now();
        queue.created_at = now;
        queue.updated_at = now;

        self.queues.create(&queue).await?;

        Ok(queue)
    }

    /// Replaces the queue's settings, keeping its original creation time.
    pub async fn update(&self, mut queue: Queue) -> Result<Queue, Error> {
        queue.validate()?;

        let stored = self.queues.get(&queue.id).await?;
        queue.created_at = stored.created_at;
        queue.updated_at = Utc::now();

        self.queues.update(&queue).await?;

        Ok(queue)
    }

    pub async fn get(&self, id: &str) -> Result<Queue, Error> {
        self.queues.get(id).await
    }

    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Queue>, Error> {
        self.queues.list(offset, limit).await
    }

    /// Deletes the queue row. Its messages are left for purge or cleanup.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let queue = self.queues.get(id).await?;
        self.queues.delete(&queue.id).await
    }

    pub async fn stats(&self, id: &str) -> Result<QueueStats, Error> {
        let queue = self.queues.get(id).await?;
        self.queues.stats(&queue.id, Utc::now()).await
    }

    /// Removes every message of the queue. Returns how many were deleted.
    pub async fn purge(&self, id: &str) -> Result<u64, Error> {
        let queue = self.queues.get(id).await?;
        self.queues.purge(&queue.id).await
    }

    /// Removes the acked and retention-expired messages of the queue.
    pub async fn cleanup(&self, id: &str) -> Result<u64, Error> {
        let queue = self.queues.get(id).await?;
        self.queues.cleanup(&queue.id, Utc::now()).await
    }
}
