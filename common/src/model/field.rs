use serde::{Deserialize, Serialize};

/// Input type of a form question. Only affects how the client renders the
/// step and how the server normalizes the submitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Url,
    File,
}

/// One configurable question of the registration form and, at the same time,
/// one column of the remote CSV document.
///
/// The order of a `Vec<FieldDefinition>` is the order of the form steps and of
/// the CSV columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Column header shown to humans.
    pub label: String,
    /// Stable property name used in submitted payloads. Unique within a schema.
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDefinition {
    pub fn new(label: &str, key: &str, field_type: FieldType) -> Self {
        Self {
            label: label.to_string(),
            key: key.to_string(),
            field_type,
        }
    }
}

/// Schema used until an admin saves a different one.
pub fn default_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("Name", "name", FieldType::Text),
        FieldDefinition::new("Email", "email", FieldType::Email),
        FieldDefinition::new("Phone", "phone", FieldType::Tel),
    ]
}
