use crate::api::error::AppError;
use crate::entities::{attachments, patients, prelude::*};
use crate::services::storage::AttachmentStorage;
use crate::utils::validation::validate_patient_name;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::warn;

/// Fields accepted by both create and update. Updates are full-field:
/// an omitted optional clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct PatientInput {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
}

/// CRUD over patient records, plus the cascade that keeps attachment
/// metadata consistent when a patient goes away.
pub struct PatientService {
    db: DatabaseConnection,
    storage: Arc<dyn AttachmentStorage>,
}

impl PatientService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn AttachmentStorage>) -> Self {
        Self { db, storage }
    }

    pub async fn create(&self, input: PatientInput) -> Result<patients::Model, AppError> {
        let name = validate_patient_name(input.name.as_deref())?;

        let now = Utc::now();
        let patient = patients::ActiveModel {
            name: Set(name),
            date_of_birth: Set(input.date_of_birth),
            phone: Set(input.phone),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(patient.insert(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> Result<patients::Model, AppError> {
        Patients::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
    }

    /// All patients, most recently created first.
    pub async fn list(&self) -> Result<Vec<patients::Model>, AppError> {
        Ok(Patients::find()
            .order_by_desc(patients::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Full-field update. `updated_at` is refreshed on every successful
    /// call, including ones that change nothing visible.
    pub async fn update(&self, id: i32, input: PatientInput) -> Result<patients::Model, AppError> {
        let existing = self.get(id).await?;
        let name = validate_patient_name(input.name.as_deref())?;

        let mut patient: patients::ActiveModel = existing.into();
        patient.name = Set(name);
        patient.date_of_birth = Set(input.date_of_birth);
        patient.phone = Set(input.phone);
        patient.updated_at = Set(Utc::now());

        Ok(patient.update(&self.db).await?)
    }

    /// Deletes the patient and every attachment row that references it.
    /// Underlying files are removed best-effort: a failed unlink is logged
    /// and never blocks the metadata deletes.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let patient = self.get(id).await?;

        let owned = Attachments::find()
            .filter(attachments::Column::PatientId.eq(id))
            .all(&self.db)
            .await?;

        for attachment in &owned {
            if let Err(e) = self.storage.remove(&attachment.path).await {
                warn!("Could not delete file {}: {}", attachment.path, e);
            }
        }

        Attachments::delete_many()
            .filter(attachments::Column::PatientId.eq(id))
            .exec(&self.db)
            .await?;

        Patients::delete_by_id(patient.id).exec(&self.db).await?;

        Ok(())
    }
}
