//! # Availability Handlers
//!
//! Read access to the slot ledger.

use axum::{extract::State, Json};
use pawbook_core::{
    errors::BookingError,
    ledger,
    models::slot::{AvailabilityQuery, SlotResponse},
};
use std::sync::Arc;

use crate::{
    middleware::{error_handling::AppError, extract::QueryParams},
    ApiState,
};

/// Lists the open slots on one day, earliest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/availability?date=2024-01-01
/// ```
///
/// # Errors
///
/// * `400 Bad Request` - `date` missing or not `YYYY-MM-DD`
pub async fn list_available(
    State(state): State<Arc<ApiState>>,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let date = query
        .date
        .ok_or_else(|| BookingError::Validation("Date parameter is required".to_string()))?;

    let slots = ledger::available_on(&*state.store, &date).await?;
    Ok(Json(slots.into_iter().map(SlotResponse::from).collect()))
}
