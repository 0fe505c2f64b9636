use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::{error::Error, validation::ValidationErrors};

/// A named fan-out point. Messages published to a topic are copied to the
/// queue of every matching subscription.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq)]
pub struct Topic {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: DateTime::default(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();
        errors.require_id("id", &self.id);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        let Err(Error::ValidationFailed { errors }) = Topic::new("my@invalid@id").validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"id":"must be in a valid format"}"#
        );

        assert!(Topic::new("my-topic").validate().is_ok());
    }
}
