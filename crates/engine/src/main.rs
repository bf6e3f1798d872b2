use anyhow::Result;
use std::time::Duration;
use tracing::info;

use engine::jobs::{AuditRetentionJob, JobScheduler, PoolMetricsJob};
use engine::{config::EngineConfig, logging};
use persistence::repositories::AuditEntryRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = EngineConfig::load()?;

    // Initialize logging
    logging::init_logging(&config.logging);

    info!("Starting Worktime engine v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&config.pool_config()).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Register background jobs
    let mut scheduler = JobScheduler::new();
    scheduler.register(AuditRetentionJob::new(
        AuditEntryRepository::new(pool.clone()),
        config.retention.audit_retention_days,
        config.retention.sweep_batch_size,
    ));
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    info!("Engine running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;

    Ok(())
}
