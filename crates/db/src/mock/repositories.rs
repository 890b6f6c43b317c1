use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mockall::mock;
use pawbook_core::{
    errors::BookingResult,
    models::{
        appointment::{Appointment, AppointmentDetails, CancelOutcome, NewAppointment},
        dog::{Dog, DogChanges, DogRemoval, NewDog},
        service::Service,
        slot::Slot,
        user::{NewUser, User},
    },
    store::{AccountStore, AppointmentStore, ServiceCatalog, SlotLedger},
};
use uuid::Uuid;

// Mock store for testing failure paths that the in-memory store cannot produce
mock! {
    pub BookingStore {}

    #[async_trait]
    impl SlotLedger for BookingStore {
        async fn has_slots_on(&self, date: NaiveDate) -> BookingResult<bool>;
        async fn insert_slots(&self, date: NaiveDate, times: &[NaiveTime]) -> BookingResult<u64>;
        async fn list_available(&self, date: NaiveDate) -> BookingResult<Vec<Slot>>;
        async fn find_slot(&self, date: NaiveDate, time: NaiveTime) -> BookingResult<Option<Slot>>;
        async fn set_available(
            &self,
            date: NaiveDate,
            time: NaiveTime,
            available: bool,
        ) -> BookingResult<Slot>;
    }

    #[async_trait]
    impl AppointmentStore for BookingStore {
        async fn book(&self, new: NewAppointment) -> BookingResult<Option<Appointment>>;
        async fn get_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>>;
        async fn cancel_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<CancelOutcome>>;
        async fn delete_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>>;
        async fn list_appointments(&self, user_id: Uuid) -> BookingResult<Vec<AppointmentDetails>>;
    }

    #[async_trait]
    impl AccountStore for BookingStore {
        async fn create_user(&self, user: NewUser, dog: Option<NewDog>) -> BookingResult<Option<User>>;
        async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>>;
        async fn get_user_by_email(&self, email: &str) -> BookingResult<Option<User>>;
        async fn list_dogs(&self, user_id: Uuid) -> BookingResult<Vec<Dog>>;
        async fn get_dog(&self, id: Uuid) -> BookingResult<Option<Dog>>;
        async fn create_dog(&self, user_id: Uuid, dog: NewDog) -> BookingResult<Dog>;
        async fn update_dog(&self, id: Uuid, changes: DogChanges) -> BookingResult<Option<Dog>>;
        async fn delete_dog(&self, id: Uuid) -> BookingResult<DogRemoval>;
    }

    #[async_trait]
    impl ServiceCatalog for BookingStore {
        async fn list_services(&self) -> BookingResult<Vec<Service>>;
        async fn get_service(&self, id: Uuid) -> BookingResult<Option<Service>>;
    }
}
