use crate::api::error::AppError;
use crate::api::handlers::MessageResponse;
use crate::entities::attachments;
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use utoipa::ToSchema;

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// The file to attach (JPG, PNG or PDF, at most 5 MiB)
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/patients/{id}/attachments",
    params(
        ("id" = i32, Path, description = "Patient ID")
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Attachment stored", body = attachments::Model),
        (status = 400, description = "Missing file, disallowed type"),
        (status = 404, description = "Patient not found"),
        (status = 413, description = "File exceeds the 5 MiB ceiling")
    ),
    tag = "attachments"
)]
pub async fn upload_attachment(
    State(state): State<crate::AppState>,
    Path(patient_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<attachments::Model>), AppError> {
    // 404 before the form is even read
    state.patients.get(patient_id).await?;

    let mut uploaded = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let original_name = field.file_name().unwrap_or("unnamed").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;

            uploaded = Some((original_name, content_type, data));
        }
    }

    let (original_name, content_type, data) =
        uploaded.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let attachment = state
        .attachments
        .upload(patient_id, &original_name, &content_type, data.len(), &data)
        .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

#[utoipa::path(
    get,
    path = "/attachments/{id}",
    params(
        ("id" = i32, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "File bytes with the original name as disposition"),
        (status = 404, description = "Attachment record or underlying file missing")
    ),
    tag = "attachments"
)]
pub async fn download_attachment(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let (attachment, data) = state.attachments.download(id).await?;

    let headers = [
        (header::CONTENT_TYPE, attachment.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.original_name),
        ),
        (header::CONTENT_LENGTH, attachment.size.to_string()),
    ];

    Ok((headers, Body::from(data)).into_response())
}

#[utoipa::path(
    delete,
    path = "/attachments/{id}",
    params(
        ("id" = i32, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Metadata deleted, file removed best-effort", body = MessageResponse),
        (status = 404, description = "Attachment not found")
    ),
    tag = "attachments"
)]
pub async fn delete_attachment(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    state.attachments.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Attachment deleted".to_string(),
    }))
}
