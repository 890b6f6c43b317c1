use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers::appointments, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            put(appointments::update_appointment).delete(appointments::delete_appointment),
        )
}
