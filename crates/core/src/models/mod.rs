pub mod appointment;
pub mod dog;
pub mod service;
pub mod slot;
pub mod user;
