//! VolunteerHub event service
//!
//! Main application entry point

use anyhow::Context;
use tracing::{info, warn};

use VolunteerHub::{
    config::Settings,
    database::{connection, DatabaseService},
    scheduler::CompletionSweeper,
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate().context("Invalid configuration")?;

    // Initialize logging; the guard flushes the file appender on drop
    let _guard = logging::init_logging(&settings.logging).context("Failed to initialize logging")?;

    info!("Starting VolunteerHub event service...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig::from(&settings.database);
    let db_pool = connection::create_pool(&db_config)
        .await
        .context("Failed to connect to database")?;

    // Run database migrations
    info!("Running database migrations...");
    connection::run_migrations(&db_pool)
        .await
        .context("Failed to run migrations")?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(db_pool);
    let services =
        ServiceFactory::new(&settings, database_service).context("Failed to initialize services")?;

    let health = services.health_check().await;
    if health.is_healthy() {
        info!("All critical services healthy");
    } else {
        for issue in health.get_issues() {
            warn!(issue = %issue, "Service issue detected at startup");
        }
    }

    match services.database.get_system_stats().await {
        Ok(stats) => info!(stats = %stats, "Current system stats"),
        Err(e) => warn!(error = %e, "Could not read system stats"),
    }

    // Start the completion sweeper
    let mut sweeper = CompletionSweeper::new(services.lifecycle.clone(), &settings.scheduler);
    sweeper.start();

    info!("VolunteerHub is ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    sweeper.stop();

    info!("VolunteerHub has been shut down.");
    Ok(())
}
