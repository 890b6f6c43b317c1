use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers::profile, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/profile", get(profile::get_profile))
        .route(
            "/api/profile/dogs",
            get(profile::list_dogs).post(profile::add_dog),
        )
        .route(
            "/api/profile/dogs/:id",
            put(profile::update_dog).delete(profile::delete_dog),
        )
}
