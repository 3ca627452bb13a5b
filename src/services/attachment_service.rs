use crate::api::error::AppError;
use crate::entities::{attachments, prelude::*};
use crate::services::storage::AttachmentStorage;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::warn;

/// Attachment metadata rows plus the file placement they describe.
///
/// Callers are expected to have checked that the owning patient exists
/// before invoking `upload`; this service does not re-validate the
/// foreign key beyond what SQLite enforces.
pub struct AttachmentService {
    db: DatabaseConnection,
    storage: Arc<dyn AttachmentStorage>,
}

impl AttachmentService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn AttachmentStorage>) -> Self {
        Self { db, storage }
    }

    /// Places the file on disk, then records its metadata. If the insert
    /// fails after the write, the file stays behind as an orphan — the
    /// metadata row is the source of truth either way.
    pub async fn upload(
        &self,
        patient_id: i32,
        original_name: &str,
        mime_type: &str,
        declared_size: usize,
        data: &[u8],
    ) -> Result<attachments::Model, AppError> {
        let placed = self
            .storage
            .place(patient_id, original_name, mime_type, declared_size, data)
            .await?;

        let attachment = attachments::ActiveModel {
            filename: Set(placed.filename),
            original_name: Set(original_name.to_string()),
            mime_type: Set(placed.mime_type),
            size: Set(placed.size as i64),
            path: Set(placed.path.to_string_lossy().into_owned()),
            patient_id: Set(patient_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(attachment.insert(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> Result<attachments::Model, AppError> {
        Attachments::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Attachment not found".to_string()))
    }

    /// Attachments for one patient, most recently created first.
    pub async fn list_for_patient(
        &self,
        patient_id: i32,
    ) -> Result<Vec<attachments::Model>, AppError> {
        Ok(Attachments::find()
            .filter(attachments::Column::PatientId.eq(patient_id))
            .order_by_desc(attachments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Metadata row plus the stored bytes. A row whose file has gone
    /// missing surfaces as NotFound; the row itself stays until an
    /// explicit delete.
    pub async fn download(&self, id: i32) -> Result<(attachments::Model, Vec<u8>), AppError> {
        let attachment = self.get(id).await?;
        let data = self.storage.read(&attachment.path).await?;
        Ok((attachment, data))
    }

    /// Deletes the metadata row. The file is removed best-effort first;
    /// an unlink failure is logged and the row delete proceeds anyway.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let attachment = self.get(id).await?;

        if let Err(e) = self.storage.remove(&attachment.path).await {
            warn!("Could not delete file {}: {}", attachment.path, e);
        }

        Attachments::delete_by_id(attachment.id)
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
