//! # Pawbook API
//!
//! The API crate provides the web server for the Pawbook grooming salon:
//! accounts, the service catalogue, slot availability and appointment booking.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Validate requests and translate them into store or scheduler calls
//! - **Middleware**: Bearer-token authentication and error-to-response mapping
//! - **Config**: Environment-driven settings
//!
//! Handlers never talk to Postgres directly; they go through the
//! [`Store`](pawbook_core::store::Store) carried in [`ApiState`], so the same
//! router runs against `PgStore` in production and `MemoryStore` in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use eyre::Result;
use pawbook_core::{scheduler::AppointmentScheduler, store::Store};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::TokenIssuer;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use pawbook_api::{app, middleware::auth::TokenIssuer, ApiState};
/// use pawbook_db::MemoryStore;
///
/// let state = ApiState::new(
///     Arc::new(MemoryStore::with_default_catalogue()),
///     TokenIssuer::new(b"secret", 24),
/// );
/// let router = app(Arc::new(state));
/// ```
pub struct ApiState {
    /// Persistence for users, dogs, services, slots and appointments
    pub store: Arc<dyn Store>,
    /// Booking workflow over the same store
    pub scheduler: AppointmentScheduler,
    /// Issues and verifies bearer tokens
    pub tokens: TokenIssuer,
}

impl ApiState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self {
            scheduler: AppointmentScheduler::new(store.clone()),
            store,
            tokens,
        }
    }
}

/// Builds the application router with every route attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration, login and session status
        .merge(routes::auth::routes())
        // Service catalogue
        .merge(routes::services::routes())
        // Slot availability
        .merge(routes::availability::routes())
        // Appointment booking
        .merge(routes::appointments::routes())
        // Profile and dogs
        .merge(routes::profile::routes())
        .with_state(state)
}

/// Installs the global `tracing` subscriber. Call once, before anything logs.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server with the provided configuration and store
///
/// Expects tracing to be initialised already (see [`init_tracing`]).
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # async fn run() -> eyre::Result<()> {
/// let config = pawbook_api::config::ApiConfig::from_env()?;
/// let pool = pawbook_db::create_pool(&config.database_url).await?;
/// let store = Arc::new(pawbook_db::PgStore::new(pool));
/// pawbook_api::start_server(config, store).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn Store>) -> Result<()> {
    let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_expiry_hours);
    let state = Arc::new(ApiState::new(store, tokens));

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Request tracing and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_must_be_valid_header_values() {
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        assert!(cors_layer(&["http://bad\norigin".to_string()]).is_err());
    }
}
