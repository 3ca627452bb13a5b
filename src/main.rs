use dotenvy::dotenv;
use patient_records::config::AppConfig;
use patient_records::infrastructure::{database, storage};
use patient_records::services::attachment_service::AttachmentService;
use patient_records::services::patient_service::PatientService;
use patient_records::utils::validation::ALLOWED_MIME_TYPES;
use patient_records::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patient_records=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting patient record backend...");

    let config = AppConfig::from_env();
    info!(
        "🛡️  Upload limits: Max Size={}MB, Types={:?}",
        config.max_file_size / 1024 / 1024,
        ALLOWED_MIME_TYPES
    );

    // Setup Infrastructure
    let db = database::setup_database(&config.database_url).await?;
    let attachment_storage = storage::setup_storage(&config).await?;

    let patients = Arc::new(PatientService::new(db.clone(), attachment_storage.clone()));
    let attachments = Arc::new(AttachmentService::new(
        db.clone(),
        attachment_storage.clone(),
    ));

    let state = AppState {
        db,
        patients,
        attachments,
        config: config.clone(),
    };

    let app = create_app(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            })
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    info!(
                        "📤 Finished in {:?} with status {}",
                        latency,
                        response.status()
                    );
                },
            ),
    );

    let addr: SocketAddr = config.bind_addr.parse()?;
    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
