pub mod appointments;
pub mod auth;
pub mod availability;
pub mod profile;
pub mod services;

use pawbook_core::errors::BookingError;

/// Returns the trimmed value of a required text field, or `None` when it is
/// absent or blank.
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn missing_fields(message: &str) -> BookingError {
    BookingError::Validation(message.to_string())
}
