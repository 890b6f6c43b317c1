//! # Account Handlers
//!
//! Registration, login and session status. Sessions are stateless bearer
//! tokens, so logout only acknowledges the caller; the client discards its
//! token.

use axum::{extract::State, http::StatusCode, Json};
use pawbook_core::{
    errors::BookingError,
    models::{
        dog::NewDog,
        user::{
            AuthStatusResponse, LoginRequest, LoginResponse, MessageResponse, NewUser,
            RegisterRequest,
        },
    },
};
use std::sync::Arc;
use tracing::{debug, info};

use super::{missing_fields, required};
use crate::{
    middleware::{
        auth::{hash_password, verify_password, AuthUser},
        error_handling::AppError,
        extract::JsonBody,
    },
    ApiState,
};

/// Creates an account, optionally together with the user's first dog.
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// ```
///
/// # Request Body
///
/// ```json
/// {
///   "full_name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "secret",
///   "dog_name": "Rex",
///   "dog_breed": "Beagle",
///   "dog_age": 3
/// }
/// ```
///
/// The dog fields are optional; a dog is created only when `dog_name` is
/// present. User and dog are committed together.
///
/// # Errors
///
/// * `400 Bad Request` - full name, email or password missing
/// * `409 Conflict` - the email is already registered
pub async fn register(
    State(state): State<Arc<ApiState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let missing = || missing_fields("Missing required fields (full_name, email, password)");
    let full_name = required(&request.full_name).ok_or_else(missing)?;
    let email = required(&request.email).ok_or_else(missing)?;
    let password = request
        .password
        .as_deref()
        .filter(|password| !password.is_empty())
        .ok_or_else(missing)?;

    let dog = required(&request.dog_name).map(|name| NewDog {
        name: name.to_string(),
        breed: request.dog_breed.clone(),
        age: request.dog_age,
    });

    let user = NewUser {
        full_name: full_name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)
            .map_err(|e| BookingError::Internal(e.into()))?,
    };

    let created = state.store.create_user(user, dog).await?.ok_or_else(|| {
        BookingError::Conflict("User with this email already exists".to_string())
    })?;

    info!("Registered user {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Exchanges credentials for an access token.
///
/// # Errors
///
/// * `400 Bad Request` - email or password missing
/// * `401 Unauthorized` - unknown email or wrong password
pub async fn login(
    State(state): State<Arc<ApiState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let missing = || missing_fields("Missing email or password");
    let email = required(&request.email).ok_or_else(missing)?;
    let password = request.password.as_deref().ok_or_else(missing)?;

    let invalid = || BookingError::Authentication("Invalid email or password".to_string());
    let user = state
        .store
        .get_user_by_email(email)
        .await?
        .ok_or_else(invalid)?;

    let matches = verify_password(password, &user.password_hash)
        .map_err(|e| BookingError::Internal(e.into()))?;
    if !matches {
        debug!("Failed login for user {}", user.id);
        return Err(invalid().into());
    }

    let access_token = state.tokens.issue(user.id)?;
    Ok(Json(LoginResponse { access_token }))
}

pub async fn logout(AuthUser(user_id): AuthUser) -> Json<MessageResponse> {
    debug!("User {} logged out", user_id);
    Json(MessageResponse::new("Logout successful"))
}

/// Reports whether the request carries a valid token. Never fails.
pub async fn status(user: Option<AuthUser>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        logged_in: user.is_some(),
        user_id: user.map(|AuthUser(id)| id),
    })
}
