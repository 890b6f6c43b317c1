use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use pawbook_api::config::ApiConfig;
use pawbook_db::{create_pool, schema::initialize_database, PgStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    pawbook_api::init_tracing(config.log_level)?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;
    info!("Database schema ready");

    // Start API server
    pawbook_api::start_server(config, Arc::new(PgStore::new(db_pool))).await?;

    Ok(())
}
