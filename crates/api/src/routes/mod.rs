pub mod appointments;
pub mod auth;
pub mod availability;
pub mod health;
pub mod profile;
pub mod services;
