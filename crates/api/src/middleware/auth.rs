//! # Authentication Module
//!
//! Password hashing with Argon2 and bearer-token identity for the Pawbook API.
//!
//! Passwords are stored as PHC strings (algorithm, parameters, salt and hash
//! in one value). Access tokens are HS256 JWTs whose subject is the user id;
//! the [`AuthUser`] extractor resolves a request's `Authorization: Bearer`
//! header back to that id.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use eyre::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pawbook_core::errors::{BookingError, BookingResult};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password using the Argon2 algorithm
///
/// A fresh random salt is generated for every call, so hashing the same
/// password twice yields different strings.
///
/// # Example
///
/// ```rust
/// use pawbook_api::middleware::auth::{hash_password, verify_password};
///
/// let hashed = hash_password("user_password").unwrap();
/// assert!(verify_password("user_password", &hashed).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; an unparseable stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;
    let is_valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(is_valid)
}

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            // Out-of-range lifetimes saturate; `issue` rejects the overflow.
            lifetime: Duration::try_hours(lifetime_hours).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> BookingResult<String> {
        let now = Utc::now();
        let expires = now.checked_add_signed(self.lifetime).ok_or_else(|| {
            BookingError::Internal("Token lifetime overflows the clock".into())
        })?;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| BookingError::Internal(Box::new(e)))
    }

    /// Resolves a token to the user id it was issued for.
    pub fn verify(&self, token: &str) -> BookingResult<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            debug!("Rejected access token: {}", e);
            BookingError::Authentication("Invalid or expired token".to_string())
        })?;
        Ok(data.claims.sub)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated caller. Extracting it fails with 401 when the request
/// carries no valid bearer token; use `Option<AuthUser>` where login is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            BookingError::Authentication("Missing bearer token".to_string())
        })?;
        let user_id = state.tokens.verify(token)?;
        Ok(AuthUser(user_id))
    }
}
