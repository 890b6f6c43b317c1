pub mod appointment;
pub mod availability;
pub mod dog;
pub mod service;
pub mod user;

/// True when the report wraps a Postgres foreign-key violation.
pub fn is_foreign_key_violation(report: &eyre::Report) -> bool {
    report
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_foreign_key_violation())
}

/// True when the report wraps a Postgres unique-constraint violation.
pub fn is_unique_violation(report: &eyre::Report) -> bool {
    report
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}
