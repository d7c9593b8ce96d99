use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attendee's answers, keyed by `FieldDefinition::key`, plus the
/// timestamp assigned by the server when the submission was accepted.
///
/// Records are immutable once queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub values: BTreeMap<String, String>,
    /// ISO-8601 UTC timestamp, e.g. `2024-05-01T09:30:00.000Z`.
    pub date: String,
}

impl RegistrationRecord {
    /// Value submitted for `key`, or an empty string when the field was absent.
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}
