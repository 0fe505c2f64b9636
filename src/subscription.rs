use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::{error::Error, message::Message, validation::ValidationErrors};

/// Routes messages published on `topic_id` into `queue_id`.
///
/// `message_filters` maps an attribute key to the values it accepts. A message
/// matches when, for every key, it carries that attribute with one of the
/// accepted values. No filters means every message matches.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, bon::Builder)]
pub struct Subscription {
    #[builder(into)]
    pub id: String,
    #[builder(into)]
    pub topic_id: String,
    #[builder(into)]
    pub queue_id: String,
    #[sqlx(json)]
    #[builder(default)]
    pub message_filters: HashMap<String, Vec<String>>,
    #[builder(default)]
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = ValidationErrors::new();
        errors
            .require_id("id", &self.id)
            .require_id("topic_id", &self.topic_id)
            .require_id("queue_id", &self.queue_id);
        errors.into_result()
    }

    pub fn should_create_message(&self, message: &Message) -> bool {
        self.message_filters.iter().all(|(key, accepted)| {
            message
                .attributes
                .get(key)
                .is_some_and(|value| accepted.contains(value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(filters: Vec<(&str, Vec<&str>)>) -> Subscription {
        Subscription::builder()
            .id("my-subscription")
            .topic_id("my-topic")
            .queue_id("my-queue")
            .message_filters(
                filters
                    .into_iter()
                    .map(|(k, vs)| (k.to_owned(), vs.into_iter().map(str::to_owned).collect()))
                    .collect(),
            )
            .build()
    }

    fn message(attributes: Vec<(&str, &str)>) -> Message {
        Message::builder()
            .body("hello")
            .attributes(
                attributes
                    .into_iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
            )
            .build()
    }

    #[test]
    fn validation() {
        let invalid = Subscription::builder()
            .id("my@invalid@id")
            .topic_id("my@invalid@id")
            .queue_id("my@invalid@id")
            .build();
        let Err(Error::ValidationFailed { errors }) = invalid.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"id":"must be in a valid format","queue_id":"must be in a valid format","topic_id":"must be in a valid format"}"#
        );

        assert!(subscription(vec![]).validate().is_ok());
    }

    #[test]
    fn should_create_message() {
        let cases = vec![
            (vec![], vec![], true),
            (vec![], vec![("type", "message")], true),
            (vec![("type", vec!["message"])], vec![], false),
            (vec![("type", vec!["message"])], vec![("type", "message2")], false),
            (vec![("type", vec!["message"])], vec![("type", "message")], true),
            (
                vec![("type", vec!["message", "message2"])],
                vec![("type", "message")],
                true,
            ),
            (
                vec![("type", vec!["message", "message2"])],
                vec![("type", "message2")],
                true,
            ),
            (
                vec![("type", vec!["message"]), ("subtype", vec!["post"])],
                vec![("type", "message")],
                false,
            ),
            (
                vec![("type", vec!["message"]), ("subtype", vec!["post"])],
                vec![("type", "message"), ("subtype", "comment")],
                false,
            ),
            (
                vec![("type", vec!["message"]), ("subtype", vec!["post"])],
                vec![("type", "message"), ("subtype", "post")],
                true,
            ),
            (
                vec![("type", vec!["message"]), ("subtype", vec!["post", "comment"])],
                vec![("type", "message"), ("subtype", "comment"), ("lang", "en")],
                true,
            ),
        ];

        for (i, (filters, attributes, expected)) in cases.into_iter().enumerate() {
            assert_eq!(
                subscription(filters).should_create_message(&message(attributes)),
                expected,
                "case {i}"
            );
        }
    }
}
