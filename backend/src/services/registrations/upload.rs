use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use common::model::field::{FieldDefinition, FieldType};
use common::model::registration::RegistrationRecord;
use common::responses::MessageResponse;
use serde_json::{Map, Value};

/// `POST /upload`. Always answers 200 once the record is queued.
pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<Map<String, Value>>,
) -> impl Responder {
    let fields = state.store.form_fields().await;
    let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let record = normalize_submission(&fields, &payload, date);

    state.flusher.submit(record);
    HttpResponse::Ok().json(MessageResponse::new("Registration submitted successfully"))
}

/// Builds the stored record for a raw submission.
///
/// Every schema field gets a value: the body's entry under the field key,
/// else under its label, else an empty string. Telephone numbers are trimmed.
/// Keys that are not in the schema are dropped.
pub fn normalize_submission(
    fields: &[FieldDefinition],
    body: &Map<String, Value>,
    date: String,
) -> RegistrationRecord {
    let values = fields
        .iter()
        .map(|field| {
            let raw = body
                .get(&field.key)
                .or_else(|| body.get(&field.label))
                .map(stringify)
                .unwrap_or_default();
            let value = match field.field_type {
                FieldType::Tel => raw.trim().to_string(),
                _ => raw,
            };
            (field.key.clone(), value)
        })
        .collect();

    RegistrationRecord { values, date }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
