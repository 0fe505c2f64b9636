use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::{error::Error, validation::ValidationErrors};

/// A named queue and the delivery settings applied to its messages.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, bon::Builder)]
pub struct Queue {
    #[builder(into)]
    pub id: String,
    /// Length of the lease granted to a consumer, in seconds.
    pub ack_deadline_seconds: u32,
    /// Lifetime of a message from enqueue, in seconds.
    pub message_retention_seconds: u32,
    /// Initial invisibility of a freshly enqueued message, in seconds.
    #[builder(default)]
    pub delivery_delay_seconds: u32,
    #[builder(default)]
    pub created_at: DateTime<Utc>,
    #[builder(default)]
    pub updated_at: DateTime<Utc>,
}

impl Queue {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();
        errors
            .require_id("id", &self.id)
            .require_nonzero("ack_deadline_seconds", self.ack_deadline_seconds)
            .require_nonzero("message_retention_seconds", self.message_retention_seconds);
        errors.into_result()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Messages deliverable right now. Leased and delayed messages are not counted.
    pub num_undelivered_messages: u64,
    pub oldest_unacked_message_age_seconds: u64,
}
