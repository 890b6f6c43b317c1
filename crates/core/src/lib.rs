//! Domain layer for the Pawbook grooming-salon booking service.
//!
//! Holds the record types shared by the storage and HTTP crates, the error
//! taxonomy, the storage contracts, and the two pieces of real scheduling
//! logic: slot population ([`ledger`]) and appointment booking
//! ([`scheduler`]).

pub mod errors;
pub mod ledger;
pub mod models;
pub mod scheduler;
pub mod store;
