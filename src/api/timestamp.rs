//! Timestamp fields in request bodies.
//!
//! Clients may send epoch milliseconds as a JSON number, the same number as a
//! string, or an RFC 3339 string. Anything else is rejected as `Invalid <field>`.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    Millis(i64),
    Text(String),
}

impl TimestampInput {
    /// Resolves to a UTC instant, naming `field` in the validation error.
    pub fn resolve(&self, field: &str) -> Result<DateTime<Utc>> {
        let invalid = || Error::validation(format!("Invalid {field}"));
        match self {
            Self::Millis(millis) => from_millis(*millis).ok_or_else(invalid),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(invalid());
                }
                if let Ok(millis) = text.parse::<i64>() {
                    return from_millis(millis).ok_or_else(invalid);
                }
                DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| invalid())
            }
        }
    }
}

/// Resolves an optional timestamp field.
pub fn resolve_optional(input: Option<&TimestampInput>, field: &str) -> Result<Option<DateTime<Utc>>> {
    input.map(|value| value.resolve(field)).transpose()
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}
