//! # Profile Handlers
//!
//! The caller's own account and dogs. Dog routes check ownership explicitly:
//! an unknown dog is 404, somebody else's dog is 403.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use pawbook_core::{
    errors::BookingError,
    models::{
        dog::{CreateDogRequest, Dog, DogChanges, DogEnvelope, DogRemoval, DogResponse, NewDog},
        user::{MessageResponse, ProfileResponse},
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::required;
use crate::{
    middleware::{
        auth::AuthUser,
        error_handling::AppError,
        extract::{JsonBody, PathParam},
    },
    ApiState,
};

pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

pub async fn list_dogs(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DogResponse>>, AppError> {
    let dogs = state.store.list_dogs(user_id).await?;
    Ok(Json(dogs.into_iter().map(DogResponse::from).collect()))
}

pub async fn add_dog(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    JsonBody(request): JsonBody<CreateDogRequest>,
) -> Result<(StatusCode, Json<DogEnvelope>), AppError> {
    let name = required(&request.name)
        .ok_or_else(|| BookingError::Validation("Dog name is required".to_string()))?;

    let dog = state
        .store
        .create_dog(
            user_id,
            NewDog {
                name: name.to_string(),
                breed: request.breed,
                age: request.age,
            },
        )
        .await?;

    info!("User {} added dog {}", user_id, dog.id);
    Ok((
        StatusCode::CREATED,
        Json(DogEnvelope {
            message: "Dog added successfully".to_string(),
            dog: dog.into(),
        }),
    ))
}

/// Partially updates a dog. `breed` and `age` may be set to `null` to clear them.
pub async fn update_dog(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    PathParam(dog_id): PathParam<Uuid>,
    JsonBody(changes): JsonBody<DogChanges>,
) -> Result<Json<DogEnvelope>, AppError> {
    owned_dog(&state, dog_id, user_id).await?;

    if changes.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(BookingError::Validation("Dog name cannot be empty".to_string()).into());
    }

    let dog = state
        .store
        .update_dog(dog_id, changes)
        .await?
        .ok_or_else(dog_not_found)?;

    Ok(Json(DogEnvelope {
        message: "Dog updated successfully".to_string(),
        dog: dog.into(),
    }))
}

/// Deletes a dog that has no appointments on record, upcoming or cancelled.
pub async fn delete_dog(
    State(state): State<Arc<ApiState>>,
    AuthUser(user_id): AuthUser,
    PathParam(dog_id): PathParam<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    owned_dog(&state, dog_id, user_id).await?;

    match state.store.delete_dog(dog_id).await? {
        DogRemoval::Deleted => {}
        DogRemoval::InUse => {
            return Err(BookingError::Conflict(
                "Cannot delete dog with existing appointments. Please cancel or reassign appointments first."
                    .to_string(),
            )
            .into());
        }
        DogRemoval::Missing => return Err(dog_not_found().into()),
    }

    info!("User {} deleted dog {}", user_id, dog_id);
    Ok(Json(MessageResponse::new("Dog deleted successfully")))
}

async fn owned_dog(state: &ApiState, dog_id: Uuid, user_id: Uuid) -> Result<Dog, AppError> {
    let dog = state
        .store
        .get_dog(dog_id)
        .await?
        .ok_or_else(dog_not_found)?;

    if dog.user_id != user_id {
        return Err(BookingError::Authorization("Forbidden: You do not own this dog".to_string()).into());
    }
    Ok(dog)
}

fn dog_not_found() -> BookingError {
    BookingError::NotFound("Dog not found".to_string())
}
