//! # Appointment Handlers
//!
//! HTTP entry points for the [`AppointmentScheduler`](pawbook_core::scheduler::AppointmentScheduler).
//! Every route here requires a bearer token; appointments are only ever
//! visible to the user who booked them.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use pawbook_core::models::appointment::{
    AppointmentResponse, AppointmentStatus, CancelAppointmentResponse, CancelOutcome,
    CreateAppointmentRequest, CreateAppointmentResponse, DeleteAppointmentResponse,
    UpdateAppointmentRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{missing_fields, required};
use crate::{
    middleware::{
        auth::AuthUser,
        error_handling::AppError,
        extract::{JsonBody, PathParam},
    },
    ApiState,
};

/// Books a slot for one of the caller's dogs.
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments
/// ```
///
/// # Request Body
///
/// ```json
/// {
///   "dog_id": "0b6f5c1e-...",
///   "service_id": "9d1e2a44-...",
///   "date": "2024-01-01",
///   "time": "09:00"
/// }
/// ```
///
/// # Errors
///
/// * `400 Bad Request` - a field is missing, or date/time is malformed
/// * `404 Not Found` - the dog is not the caller's, or the service is unknown
/// * `409 Conflict` - the slot is taken or was never offered
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    JsonBody(request): JsonBody<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<CreateAppointmentResponse>), AppError> {
    let missing = || missing_fields("Missing required fields (dog_id, service_id, date, time)");
    let dog_id = request.dog_id.ok_or_else(missing)?;
    let service_id = request.service_id.ok_or_else(missing)?;
    let date = required(&request.date).ok_or_else(missing)?;
    let time = required(&request.time).ok_or_else(missing)?;

    let details = state
        .scheduler
        .create(user_id, dog_id, service_id, date, time)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAppointmentResponse {
            message: "Appointment created successfully".to_string(),
            appointment: details.into(),
        }),
    ))
}

pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let appointments = state.scheduler.list_for(user_id).await?;
    Ok(Json(
        appointments.into_iter().map(AppointmentResponse::from).collect(),
    ))
}

/// Applies `{"status": "cancelled"}` to an appointment. Cancelling twice is
/// answered with 200 and a distinct message.
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    PathParam(appointment_id): PathParam<Uuid>,
    JsonBody(request): JsonBody<UpdateAppointmentRequest>,
) -> Result<Json<CancelAppointmentResponse>, AppError> {
    let outcome = state
        .scheduler
        .update(appointment_id, user_id, &request)
        .await?;

    let message = match outcome {
        CancelOutcome::Cancelled(_) => "Appointment cancelled successfully",
        CancelOutcome::AlreadyCancelled(_) => "Appointment is already cancelled",
    };
    Ok(Json(CancelAppointmentResponse {
        message: message.to_string(),
        appointment_id: outcome.appointment().id,
        new_status: AppointmentStatus::Cancelled,
    }))
}

pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    PathParam(appointment_id): PathParam<Uuid>,
) -> Result<Json<DeleteAppointmentResponse>, AppError> {
    let appointment = state.scheduler.delete(appointment_id, user_id).await?;
    Ok(Json(DeleteAppointmentResponse {
        message: "Appointment deleted successfully".to_string(),
        appointment_id: appointment.id,
    }))
}
