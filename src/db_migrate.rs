use chrono::Local;
use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use pawbook_api::config::{parse_log_level, SlotPlanConfig};
use pawbook_core::ledger::populate;
use pawbook_db::{
    create_pool,
    schema::{initialize_database, populate_services},
    PgStore,
};
use tracing::info;

/// Creates the schema, seeds the service catalogue and generates slots for
/// the configured horizon starting today. Safe to run repeatedly.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let log_level = parse_log_level(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));
    pawbook_api::init_tracing(log_level)?;

    // Same requirement as the server: no implicit database
    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;
    let slot_config = SlotPlanConfig::from_env()?;

    info!("Connecting to database...");
    let db_pool = create_pool(&database_url).await?;

    info!("Initializing database schema...");
    initialize_database(&db_pool).await?;

    let seeded = populate_services(&db_pool).await?;
    info!("Seeded {} services", seeded);

    let plan = slot_config.plan_from(Local::now().date_naive());
    let store = PgStore::new(db_pool);
    let report = populate(&store, &plan).await?;
    info!(
        "Populated {} days ({} slots), skipped {} already populated",
        report.populated.len(),
        report.slots_created,
        report.skipped.len()
    );

    Ok(())
}
