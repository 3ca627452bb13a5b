pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::attachment_service::AttachmentService;
use crate::services::patient_service::PatientService;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::patients::list_patients,
        api::handlers::patients::create_patient,
        api::handlers::patients::get_patient,
        api::handlers::patients::update_patient,
        api::handlers::patients::delete_patient,
        api::handlers::attachments::upload_attachment,
        api::handlers::attachments::download_attachment,
        api::handlers::attachments::delete_attachment,
    ),
    components(
        schemas(
            api::handlers::MessageResponse,
            api::handlers::health::HealthResponse,
            api::handlers::patients::PatientRequest,
            api::handlers::patients::PatientResponse,
            api::handlers::attachments::UploadForm,
            entities::patients::Model,
            entities::attachments::Model,
        )
    ),
    tags(
        (name = "patients", description = "Patient record endpoints"),
        (name = "attachments", description = "Attachment upload and download endpoints"),
        (name = "system", description = "Health and metadata")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub patients: Arc<PatientService>,
    pub attachments: Arc<AttachmentService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    // Room for multipart framing on top of the attachment ceiling
    let body_limit = state.config.max_file_size + 64 * 1024;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/patients",
            get(api::handlers::patients::list_patients)
                .post(api::handlers::patients::create_patient),
        )
        .route(
            "/patients/:id",
            get(api::handlers::patients::get_patient)
                .put(api::handlers::patients::update_patient)
                .delete(api::handlers::patients::delete_patient),
        )
        .route(
            "/patients/:id/attachments",
            post(api::handlers::attachments::upload_attachment),
        )
        .route(
            "/attachments/:id",
            get(api::handlers::attachments::download_attachment)
                .delete(api::handlers::attachments::delete_attachment),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
