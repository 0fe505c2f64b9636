use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db::{MessageRepository, QueueRepository, SubscriptionRepository, TopicRepository},
    error::Error,
    message::Message,
    telemetry::MESSAGES_ENQUEUED_TOTAL,
    topic::Topic,
};

/// Number of subscriptions read per round trip while fanning out a message.
const SUBSCRIPTION_PAGE_SIZE: u32 = 50;

#[derive(Clone)]
pub struct TopicService {
    topics: TopicRepository,
    subscriptions: SubscriptionRepository,
    queues: QueueRepository,
    messages: MessageRepository,
}

impl TopicService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            topics: TopicRepository::new(pool.clone()),
            subscriptions: SubscriptionRepository::new(pool.clone()),
            queues: QueueRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }

    pub async fn create(&self, mut topic: Topic) -> Result<Topic, Error> {
        topic.validate()?;

        topic.created_at = Utc::now();

        self.topics.create(&topic).await?;

        Ok(topic)
    }

    pub async fn get(&self, id: &str) -> Result<Topic, Error> {
        self.topics.get(id).await
    }

    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Topic>, Error> {
        self.topics.list(offset, limit).await
    }

    /// Deletes the topic. Its subscriptions are left in place.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let topic = self.topics.get(id).await?;
        self.topics.delete(&topic.id).await
    }

    /// Publishes `message` on `topic_id`: every subscription whose filters
    /// accept it gets a copy enqueued on its queue.
    ///
    /// All copies are written in one transaction. A subscription pointing at a
    /// missing queue aborts the publish before anything is written. Returns the
    /// enqueued copies, which is empty when no subscription matched.
    #[tracing::instrument(skip_all, fields(topic_id = %topic_id))]
    pub async fn create_message(
        &self,
        topic_id: &str,
        message: Message,
    ) -> Result<Vec<Message>, Error> {
        message.validate()?;

        let topic = self.topics.get(topic_id).await?;
        let now = Utc::now();

        let mut derived = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .subscriptions
                .list_by_topic(&topic.id, offset, SUBSCRIPTION_PAGE_SIZE)
                .await?;

            if page.is_empty() {
                break;
            }
            offset += SUBSCRIPTION_PAGE_SIZE;

            for subscription in page {
                if !subscription.should_create_message(&message) {
                    continue;
                }

                let queue = self.queues.get(&subscription.queue_id).await?;

                let mut copy = Message::builder()
                    .body(message.body.clone())
                    .maybe_label(message.label.clone())
                    .attributes(message.attributes.clone())
                    .build();
                copy.enqueue(&queue, now);

                tracing::debug!(
                    subscription_id = %subscription.id,
                    queue_id = %queue.id,
                    message_id = %copy.id,
                    "routing message"
                );

                derived.push(copy);
            }
        }

        self.messages.create_many(&derived).await?;

        for copy in &derived {
            metrics::counter!(MESSAGES_ENQUEUED_TOTAL, "queue_id" => copy.queue_id.clone())
                .increment(1);
        }

        tracing::debug!(count = derived.len(), "message published");

        Ok(derived)
    }
}
