use axum::{body::to_bytes, http::StatusCode};
use pawbook_api::middleware::{
    auth::{hash_password, verify_password, TokenIssuer},
    error_handling::{map_error, AppError},
};
use pawbook_core::errors::BookingError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use uuid::Uuid;

async fn body_of(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[rstest]
#[case(BookingError::NotFound("Dog not found".into()), StatusCode::NOT_FOUND)]
#[case(BookingError::Validation("Invalid input".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::Authentication("Invalid password".into()), StatusCode::UNAUTHORIZED)]
#[case(BookingError::Authorization("Not your dog".into()), StatusCode::FORBIDDEN)]
#[case(BookingError::Conflict("Slot taken".into()), StatusCode::CONFLICT)]
#[case(BookingError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(BookingError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[tokio::test]
async fn test_client_errors_carry_their_message() {
    let response = map_error(BookingError::Conflict("Selected slot is not available".into()));

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_of(response).await,
        json!({ "error": "Conflict: Selected slot is not available" })
    );
}

#[tokio::test]
async fn test_server_errors_are_not_leaked() {
    let response = map_error(BookingError::Database(eyre::eyre!(
        "password authentication failed for user \"postgres\""
    )));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(response).await, json!({ "error": "Internal server error" }));
}

#[test]
fn test_eyre_reports_become_database_errors() {
    let error: AppError = eyre::eyre!("pool timed out").into();
    assert!(matches!(error.0, BookingError::Database(_)));
}

#[test]
fn test_password_hashing() {
    let password = "test_password";

    let first = hash_password(password).unwrap();
    let second = hash_password(password).unwrap();

    // Fresh salt every time
    assert_ne!(first, second);
    assert!(verify_password(password, &first).unwrap());
    assert!(verify_password(password, &second).unwrap());
    assert!(!verify_password("wrong_password", &first).unwrap());
}

#[test]
fn test_token_round_trip() {
    let issuer = TokenIssuer::new(b"secret", 24);
    let user_id = Uuid::new_v4();

    let token = issuer.issue(user_id).unwrap();
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(issuer.verify(&token).unwrap(), user_id);

    assert!(matches!(
        issuer.verify("not.a.token"),
        Err(BookingError::Authentication(_))
    ));
}
