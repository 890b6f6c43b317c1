use axum::{extract::State, Json};
use pawbook_core::models::service::Service;
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

/// Lists the grooming service catalogue, ordered by name.
pub async fn list_services(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = state.store.list_services().await?;
    Ok(Json(services))
}
