use crate::entities::{attachments, patients};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm::{ConnectionTrait, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", database_url);

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates the schema if it does not exist yet. Idempotent — safe to run
/// on every startup and repeatedly within one process.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Order matters for the foreign key: patients before attachments
    let stmts = vec![
        (
            "patients",
            schema
                .create_table_from_entity(patients::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "attachments",
            schema
                .create_table_from_entity(attachments::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await?;
        info!("   - Table '{}' checked/created", name);
    }

    // Lookup indexes on the foreign key and on patient name
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_attachments_patient_id ON attachments(patient_id)",
        "CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name)",
    ];

    for query in indexes {
        db.execute(sea_orm::Statement::from_string(builder, query))
            .await?;
        info!("   - Executed: {}", query);
    }

    Ok(())
}
