use crate::error::AppError;
use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::model::csv::DATE_COLUMN;
use common::model::field::FieldDefinition;
use common::responses::MessageResponse;
use log::info;
use std::collections::HashSet;

pub(crate) async fn get_fields(state: web::Data<AppState>) -> impl Responder {
    match state.store.read_form_fields().await {
        Ok(fields) => HttpResponse::Ok().json(fields),
        Err(e) => failure("Error reading form fields", e),
    }
}

/// `POST /update-form-fields`.
///
/// The schema is saved locally first. The remote document is then rebuilt
/// with the new columns. If that rebuild fails, the response is a 500 but the
/// new schema stays saved, and the next flush writes with it.
pub(crate) async fn update_fields(
    state: web::Data<AppState>,
    payload: web::Json<Vec<FieldDefinition>>,
) -> impl Responder {
    let fields = payload.into_inner();
    if let Err(e) = save_fields(&state, &fields).await {
        return failure("Error updating form fields", e);
    }

    let _guard = state.flusher.document_guard().await;
    match state.repository.migrate_schema(&fields).await {
        Ok(_) => HttpResponse::Ok().json(MessageResponse::new(
            "Form fields updated successfully and CSV schema updated",
        )),
        Err(e) => failure("Form fields updated but CSV schema update failed", e),
    }
}

async fn save_fields(state: &AppState, fields: &[FieldDefinition]) -> Result<(), AppError> {
    validate_fields(fields)?;
    state.store.save_form_fields(fields).await?;
    info!("Saved form schema with {} fields", fields.len());
    Ok(())
}

/// Keys and labels must be non-empty and unique. Labels become CSV header
/// cells, so `Date` (any case) is reserved for the timestamp column.
fn validate_fields(fields: &[FieldDefinition]) -> Result<(), AppError> {
    let mut keys = HashSet::new();
    let mut labels = HashSet::new();
    for field in fields {
        if field.key.trim().is_empty() || field.label.trim().is_empty() {
            return Err(AppError::Validation(
                "Every field needs a non-empty key and label".to_string(),
            ));
        }
        if !keys.insert(field.key.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate field key: {}",
                field.key
            )));
        }
        if field.label.eq_ignore_ascii_case(DATE_COLUMN) {
            return Err(AppError::Validation(format!(
                "Field label {} is reserved",
                field.label
            )));
        }
        if !labels.insert(field.label.as_str()) {
            return Err(AppError::Validation(format!(
                "Duplicate field label: {}",
                field.label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::field::{default_fields, FieldType};

    #[test]
    fn rejects_duplicate_and_blank_keys() {
        assert!(validate_fields(&default_fields()).is_ok());

        let mut duplicated = default_fields();
        duplicated.push(FieldDefinition::new("E-mail", "email", FieldType::Email));
        assert!(validate_fields(&duplicated).is_err());

        let blank = vec![FieldDefinition::new("Name", " ", FieldType::Text)];
        assert!(validate_fields(&blank).is_err());
    }

    #[test]
    fn rejects_duplicate_labels_and_the_date_column() {
        let mut same_label = default_fields();
        same_label.push(FieldDefinition::new("Email", "work_email", FieldType::Email));
        assert!(validate_fields(&same_label).is_err());

        for label in ["Date", "date"] {
            let reserved = vec![FieldDefinition::new(label, "signed_up", FieldType::Date)];
            assert!(validate_fields(&reserved).is_err());
        }
    }
}
