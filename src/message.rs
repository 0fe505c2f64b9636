//! Message records and their delivery lifecycle.
//!
//! A message has no status column. Its state is the pair of timestamps
//! `scheduled_at` and `expired_at` compared against the current instant:
//!
//! - `scheduled_at > now`: delayed, leased to a consumer, or nacked with a timeout
//! - `scheduled_at <= now < expired_at`: visible, and will be handed to the next lease
//! - `expired_at <= now`: acked or past retention; never delivered again and
//!   removed by a queue cleanup
//!
//! Every transition below is a pure function of the message, its queue and `now`.
//! The storage layer applies them inside its own transactions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::{error::Error, queue::Queue, validation::ValidationErrors};

#[derive(Serialize, FromRow, Debug, Clone, PartialEq)]
pub struct Message {
    /// Time-sortable identifier assigned on enqueue.
    pub id: String,
    /// Queue this message belongs to.
    pub queue_id: String,
    /// Free-form classification used to filter leases.
    pub label: Option<String>,
    pub body: String,
    /// Attributes matched against subscription filters.
    #[sqlx(json)]
    pub attributes: HashMap<String, String>,
    /// Number of leases granted so far.
    pub delivery_attempts: u32,
    #[serde(skip)]
    pub expired_at: DateTime<Utc>,
    #[serde(skip)]
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

#[bon::bon]
impl Message {
    /// A message that has not been enqueued yet.
    #[builder]
    pub fn new(
        #[builder(into)] body: String,
        #[builder(into)] label: Option<String>,
        #[builder(default)] attributes: HashMap<String, String>,
    ) -> Self {
        Self {
            id: String::new(),
            queue_id: String::new(),
            label,
            body,
            attributes,
            delivery_attempts: 0,
            expired_at: DateTime::default(),
            scheduled_at: DateTime::default(),
            created_at: DateTime::default(),
            updated_at: DateTime::default(),
        }
    }
}

impl Message {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();
        errors.require("body", &self.body);
        errors.into_result()
    }

    /// Places the message on `queue`, assigning it a fresh identity.
    pub fn enqueue(&mut self, queue: &Queue, now: DateTime<Utc>) {
        self.id = uuid::Uuid::now_v7().to_string();
        self.queue_id = queue.id.clone();
        self.delivery_attempts = 0;
        self.expired_at = now + seconds(queue.message_retention_seconds);
        self.scheduled_at = now + seconds(queue.delivery_delay_seconds);
        self.created_at = now;
        self.updated_at = now;
    }

    /// Grants a lease: hides the message for the queue's ack deadline.
    pub fn lease_renew(&mut self, queue: &Queue, now: DateTime<Utc>) {
        self.delivery_attempts += 1;
        self.scheduled_at = now + seconds(queue.ack_deadline_seconds);
        self.updated_at = now;
    }

    pub fn ack(&mut self, now: DateTime<Utc>) {
        self.expired_at = now;
        self.updated_at = now;
    }

    /// Makes the message visible again after `visibility_timeout_seconds`.
    /// A timeout of zero releases it immediately.
    pub fn nack(&mut self, now: DateTime<Utc>, visibility_timeout_seconds: u32) {
        self.scheduled_at = now + seconds(visibility_timeout_seconds);
        self.updated_at = now;
    }

    /// Whether a lease taken at `now` may return this message. Storage
    /// queries express the same rule as the `db::VISIBLE` predicate.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at <= now && now < self.expired_at
    }

    /// Whether a cleanup at `now` may delete this message.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_at <= now
    }
}

fn seconds(value: u32) -> Duration {
    Duration::seconds(i64::from(value))
}
