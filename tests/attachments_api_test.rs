use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use patient_records::config::AppConfig;
use patient_records::infrastructure::database;
use patient_records::services::attachment_service::AttachmentService;
use patient_records::services::patient_service::PatientService;
use patient_records::services::storage::{AttachmentStorage, LocalStorage};
use patient_records::utils::validation::MAX_FILE_SIZE;
use patient_records::{AppState, create_app};
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------patientrecordstest";

async fn setup_app() -> (Router, TempDir) {
    let upload_dir = tempfile::tempdir().unwrap();

    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let config = AppConfig {
        upload_dir: upload_dir.path().to_path_buf(),
        ..AppConfig::default()
    };

    let storage: Arc<dyn AttachmentStorage> = Arc::new(LocalStorage::new(
        config.upload_dir.clone(),
        config.max_file_size,
    ));
    let patients = Arc::new(PatientService::new(db.clone(), storage.clone()));
    let attachments = Arc::new(AttachmentService::new(db.clone(), storage.clone()));

    let state = AppState {
        db,
        patients,
        attachments,
        config,
    };

    (create_app(state), upload_dir)
}

async fn create_patient(app: &Router, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/patients")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(r#"{{"name": "{name}"}}"#)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    json["id"].as_i64().unwrap()
}

fn multipart_body(field_name: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    app: &Router,
    patient_id: i64,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/patients/{patient_id}/attachments"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("file", filename, content_type, data)))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn delete(app: &Router, uri: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn upload_rejects_disallowed_type_and_leaves_no_trace() {
    let (app, dir) = setup_app().await;
    let patient_id = create_patient(&app, "Ana Silva").await;

    let (status, body) = upload(&app, patient_id, "notes.txt", "text/plain", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not allowed"));

    // No metadata row and no file on disk
    let (_, patient) = get_json(&app, &format!("/patients/{patient_id}")).await;
    assert_eq!(patient["attachments"].as_array().unwrap().len(), 0);
    assert!(!dir.path().join("patients").exists());
}

#[tokio::test]
async fn upload_accepts_the_ceiling_and_rejects_one_byte_over() {
    let (app, _dir) = setup_app().await;
    let patient_id = create_patient(&app, "Ana Silva").await;

    let at_ceiling = vec![0u8; MAX_FILE_SIZE];
    let (status, body) = upload(&app, patient_id, "scan.png", "image/png", &at_ceiling).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["size"].as_i64().unwrap(), MAX_FILE_SIZE as i64);

    let over = vec![0u8; MAX_FILE_SIZE + 1];
    let (status, _) = upload(&app, patient_id, "scan2.png", "image/png", &over).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn upload_to_a_missing_patient_is_404() {
    let (app, _dir) = setup_app().await;

    let (status, _) = upload(&app, 999, "scan.png", "image/png", b"png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_without_a_file_field_is_400() {
    let (app, _dir) = setup_app().await;
    let patient_id = create_patient(&app, "Ana Silva").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/patients/{patient_id}/attachments"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    "something_else",
                    "scan.png",
                    "image/png",
                    b"png",
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attachment_lifecycle_end_to_end() {
    let (app, _dir) = setup_app().await;
    let patient_id = create_patient(&app, "Ana Silva").await;

    let mut content = b"%PDF-1.4 ".to_vec();
    content.resize(1024, b' ');

    let (status, uploaded) = upload(&app, patient_id, "exam.pdf", "application/pdf", &content).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["mime_type"], "application/pdf");
    assert_eq!(uploaded["size"].as_i64().unwrap(), 1024);
    assert_eq!(uploaded["original_name"], "exam.pdf");
    assert_eq!(uploaded["patient_id"].as_i64().unwrap(), patient_id);
    assert!(uploaded["filename"].as_str().unwrap().ends_with(".pdf"));

    let attachment_id = uploaded["id"].as_i64().unwrap();

    // Listed on the patient
    let (_, patient) = get_json(&app, &format!("/patients/{patient_id}")).await;
    let listed = patient["attachments"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"].as_i64().unwrap(), attachment_id);

    // Download returns the exact bytes with presentation headers
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/attachments/{attachment_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"exam.pdf\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), content.as_slice());

    // Delete removes both the row and the file
    let path = uploaded["path"].as_str().unwrap().to_string();
    assert!(std::path::Path::new(&path).exists());
    assert_eq!(delete(&app, &format!("/attachments/{attachment_id}")).await, StatusCode::OK);
    assert!(!std::path::Path::new(&path).exists());

    let (_, patient) = get_json(&app, &format!("/patients/{patient_id}")).await;
    assert_eq!(patient["attachments"].as_array().unwrap().len(), 0);

    let (status, _) = get_json(&app, &format!("/attachments/{attachment_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_patient_cascades_to_attachment_metadata() {
    let (app, _dir) = setup_app().await;
    let patient_id = create_patient(&app, "Bruno Costa").await;

    let (_, first) = upload(&app, patient_id, "front.jpg", "image/jpeg", b"jpeg-bytes").await;
    let (_, second) = upload(&app, patient_id, "back.jpg", "image/jpeg", b"jpeg-bytes").await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    // One file already gone from disk must not block the cascade
    std::fs::remove_file(second["path"].as_str().unwrap()).unwrap();

    assert_eq!(delete(&app, &format!("/patients/{patient_id}")).await, StatusCode::OK);

    let (status, _) = get_json(&app, &format!("/patients/{patient_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, &format!("/attachments/{first_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, &format!("/attachments/{second_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_attachment_whose_file_is_gone_still_succeeds() {
    let (app, _dir) = setup_app().await;
    let patient_id = create_patient(&app, "Carla Souza").await;

    let (_, uploaded) = upload(&app, patient_id, "scan.png", "image/png", b"png-bytes").await;
    let attachment_id = uploaded["id"].as_i64().unwrap();

    std::fs::remove_file(uploaded["path"].as_str().unwrap()).unwrap();

    assert_eq!(delete(&app, &format!("/attachments/{attachment_id}")).await, StatusCode::OK);
    let (status, _) = get_json(&app, &format!("/attachments/{attachment_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_surfaces_a_missing_file_as_404_while_metadata_remains() {
    let (app, _dir) = setup_app().await;
    let patient_id = create_patient(&app, "Carla Souza").await;

    let (_, uploaded) = upload(&app, patient_id, "scan.png", "image/png", b"png-bytes").await;
    let attachment_id = uploaded["id"].as_i64().unwrap();

    std::fs::remove_file(uploaded["path"].as_str().unwrap()).unwrap();

    let (status, _) = get_json(&app, &format!("/attachments/{attachment_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The row is still listed until an explicit delete
    let (_, patient) = get_json(&app, &format!("/patients/{patient_id}")).await;
    assert_eq!(patient["attachments"].as_array().unwrap().len(), 1);
}
