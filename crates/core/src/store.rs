//! Storage contracts consumed by the scheduler and the HTTP layer.
//!
//! Every method that touches both an appointment and a slot must apply the two
//! changes as one atomic unit. Methods returning `Option` use `None` for the
//! expected "lost the race / not there" outcome; the caller decides which
//! [`BookingError`](crate::errors::BookingError) that maps to.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::{
    appointment::{Appointment, AppointmentDetails, CancelOutcome, NewAppointment},
    dog::{Dog, DogChanges, DogRemoval, NewDog},
    service::Service,
    slot::Slot,
    user::{NewUser, User},
};

#[async_trait]
pub trait SlotLedger: Send + Sync {
    async fn has_slots_on(&self, date: NaiveDate) -> BookingResult<bool>;

    /// Inserts available slots for `date`. Pairs that already exist are left
    /// untouched. Returns the number of rows created.
    async fn insert_slots(&self, date: NaiveDate, times: &[NaiveTime]) -> BookingResult<u64>;

    /// Available slots on `date`, ordered by time of day.
    async fn list_available(&self, date: NaiveDate) -> BookingResult<Vec<Slot>>;

    async fn find_slot(&self, date: NaiveDate, time: NaiveTime) -> BookingResult<Option<Slot>>;

    /// Sets the flag, creating the slot when it is missing.
    async fn set_available(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> BookingResult<Slot>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Claims the available slot at the appointment's date and time and
    /// records the appointment as upcoming. `None` when no available slot
    /// exists at that pair; `NotFound` when the dog no longer exists.
    async fn book(&self, new: NewAppointment) -> BookingResult<Option<Appointment>>;

    async fn get_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>>;

    /// Marks the appointment cancelled and releases its slot. `None` when the
    /// appointment does not exist or belongs to another user.
    async fn cancel_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<CancelOutcome>>;

    /// Removes the appointment, releasing its slot if it was still upcoming.
    async fn delete_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>>;

    /// Ordered by date then time.
    async fn list_appointments(&self, user_id: Uuid) -> BookingResult<Vec<AppointmentDetails>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates the user and, when given, their first dog. `None` when the
    /// email is already registered.
    async fn create_user(&self, user: NewUser, dog: Option<NewDog>) -> BookingResult<Option<User>>;

    async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> BookingResult<Option<User>>;

    async fn list_dogs(&self, user_id: Uuid) -> BookingResult<Vec<Dog>>;

    async fn get_dog(&self, id: Uuid) -> BookingResult<Option<Dog>>;

    async fn create_dog(&self, user_id: Uuid, dog: NewDog) -> BookingResult<Dog>;

    async fn update_dog(&self, id: Uuid, changes: DogChanges) -> BookingResult<Option<Dog>>;

    /// Deletes the dog unless an appointment references it. The check and the
    /// delete are one atomic step, so a concurrent booking cannot orphan an
    /// appointment.
    async fn delete_dog(&self, id: Uuid) -> BookingResult<DogRemoval>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn list_services(&self) -> BookingResult<Vec<Service>>;

    async fn get_service(&self, id: Uuid) -> BookingResult<Option<Service>>;
}

/// Everything the API needs from persistence.
pub trait Store: SlotLedger + AppointmentStore + AccountStore + ServiceCatalog {}

impl<T> Store for T where T: SlotLedger + AppointmentStore + AccountStore + ServiceCatalog {}
