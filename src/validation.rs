//! Field-keyed validation shared by every entity.

use std::{collections::BTreeMap, fmt};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::Error;

pub const BLANK: &str = "cannot be blank";
pub const INVALID_FORMAT: &str = "must be in a valid format";

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("id pattern is a valid regex"));

/// Whether `id` is a legal queue, topic or subscription identifier.
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

/// Validation failures keyed by field name. Serializes as a flat JSON object,
/// e.g. `{"body":"cannot be blank"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.0.entry(field).or_insert(BLANK);
        }
        self
    }

    pub fn require_nonzero(&mut self, field: &'static str, value: u32) -> &mut Self {
        if value == 0 {
            self.0.entry(field).or_insert(BLANK);
        }
        self
    }

    /// Requires a non-blank identifier matching the id format.
    pub fn require_id(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.0.entry(field).or_insert(BLANK);
        } else if !is_valid_id(value) {
            self.0.entry(field).or_insert(INVALID_FORMAT);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_format() {
        assert!(is_valid_id("my-queue"));
        assert!(is_valid_id("orders.v2_eu"));
        assert!(!is_valid_id("my@invalid@id"));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id(""));
    }

    #[test]
    fn blank_wins_over_format() {
        let mut errors = ValidationErrors::new();
        errors.require_id("id", "");

        assert_eq!(errors.get("id"), Some(BLANK));
    }

    #[test]
    fn serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors
            .require_id("id", "my@invalid@id")
            .require_nonzero("ack_deadline_seconds", 0);

        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"ack_deadline_seconds":"cannot be blank","id":"must be in a valid format"}"#
        );
        assert_eq!(
            errors.to_string(),
            "ack_deadline_seconds: cannot be blank; id: must be in a valid format"
        );
    }
}
