//! In-process store used by the test suites and for running the API without
//! PostgreSQL.
//!
//! All records live behind a single mutex; each trait method takes the lock
//! once, so compound appointment/slot writes are atomic with respect to each
//! other.

use std::collections::{btree_map::Entry, BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use pawbook_core::{
    errors::{BookingError, BookingResult},
    models::{
        appointment::{
            Appointment, AppointmentDetails, AppointmentStatus, CancelOutcome, NewAppointment,
        },
        dog::{Dog, DogChanges, DogRemoval, NewDog},
        service::{default_catalogue, NewService, Service},
        slot::Slot,
        user::{NewUser, User},
    },
    store::{AccountStore, AppointmentStore, ServiceCatalog, SlotLedger},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    dogs: HashMap<Uuid, Dog>,
    services: Vec<Service>,
    slots: BTreeMap<(NaiveDate, NaiveTime), Slot>,
    appointments: HashMap<Uuid, Appointment>,
}

impl State {
    fn release(&mut self, date: NaiveDate, time: NaiveTime) -> Slot {
        let slot = self.slots.entry((date, time)).or_insert_with(|| {
            warn!("Slot {} {} was missing; recreated it", date, time);
            Slot {
                id: Uuid::new_v4(),
                date,
                time_slot: time,
                is_available: true,
            }
        });
        slot.is_available = true;
        slot.clone()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<NewService>) -> Self {
        let services = services
            .into_iter()
            .map(|s| Service {
                id: Uuid::new_v4(),
                name: s.name,
                description: s.description,
                price: s.price,
            })
            .collect();
        Self {
            state: Mutex::new(State {
                services,
                ..State::default()
            }),
        }
    }

    /// A store seeded with the same catalogue as a fresh database.
    pub fn with_default_catalogue() -> Self {
        Self::with_services(default_catalogue())
    }

    /// Drops a slot row outright. Normal operation never deletes slots; this
    /// exists to exercise the recreation path.
    pub async fn remove_slot(&self, date: NaiveDate, time: NaiveTime) -> Option<Slot> {
        self.state.lock().await.slots.remove(&(date, time))
    }
}

#[async_trait]
impl SlotLedger for MemoryStore {
    async fn has_slots_on(&self, date: NaiveDate) -> BookingResult<bool> {
        let state = self.state.lock().await;
        Ok(state.slots.keys().any(|(d, _)| *d == date))
    }

    async fn insert_slots(&self, date: NaiveDate, times: &[NaiveTime]) -> BookingResult<u64> {
        let mut state = self.state.lock().await;
        let mut created = 0;
        for &time in times {
            if let Entry::Vacant(entry) = state.slots.entry((date, time)) {
                entry.insert(Slot {
                    id: Uuid::new_v4(),
                    date,
                    time_slot: time,
                    is_available: true,
                });
                created += 1;
            }
        }
        debug!("Inserted {} slots on {}", created, date);
        Ok(created)
    }

    async fn list_available(&self, date: NaiveDate) -> BookingResult<Vec<Slot>> {
        let state = self.state.lock().await;
        Ok(state
            .slots
            .iter()
            .filter(|((d, _), slot)| *d == date && slot.is_available)
            .map(|(_, slot)| slot.clone())
            .collect())
    }

    async fn find_slot(&self, date: NaiveDate, time: NaiveTime) -> BookingResult<Option<Slot>> {
        let state = self.state.lock().await;
        Ok(state.slots.get(&(date, time)).cloned())
    }

    async fn set_available(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> BookingResult<Slot> {
        let mut state = self.state.lock().await;
        let slot = state.slots.entry((date, time)).or_insert_with(|| {
            warn!("Slot {} {} was missing; recreated it", date, time);
            Slot {
                id: Uuid::new_v4(),
                date,
                time_slot: time,
                is_available: available,
            }
        });
        slot.is_available = available;
        Ok(slot.clone())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn book(&self, new: NewAppointment) -> BookingResult<Option<Appointment>> {
        let mut state = self.state.lock().await;

        if !state.dogs.contains_key(&new.dog_id) {
            return Err(BookingError::NotFound(
                "Dog not found or does not belong to user".to_string(),
            ));
        }

        let held = state.appointments.values().any(|a| {
            a.date == new.date && a.time == new.time && a.status == AppointmentStatus::Upcoming
        });
        let Some(slot) = state
            .slots
            .get_mut(&(new.date, new.time))
            .filter(|slot| slot.is_available && !held)
        else {
            return Ok(None);
        };
        slot.is_available = false;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            dog_id: new.dog_id,
            service_id: new.service_id,
            date: new.date,
            time: new.time,
            status: AppointmentStatus::Upcoming,
        };
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(Some(appointment))
    }

    async fn get_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>> {
        let state = self.state.lock().await;
        Ok(state
            .appointments
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned())
    }

    async fn cancel_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<CancelOutcome>> {
        let mut state = self.state.lock().await;

        let Some(appointment) = state
            .appointments
            .get_mut(&id)
            .filter(|a| a.user_id == user_id)
        else {
            return Ok(None);
        };
        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(Some(CancelOutcome::AlreadyCancelled(appointment.clone())));
        }

        appointment.status = AppointmentStatus::Cancelled;
        let cancelled = appointment.clone();
        state.release(cancelled.date, cancelled.time);
        Ok(Some(CancelOutcome::Cancelled(cancelled)))
    }

    async fn delete_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>> {
        let mut state = self.state.lock().await;

        if !state
            .appointments
            .get(&id)
            .is_some_and(|a| a.user_id == user_id)
        {
            return Ok(None);
        }
        let Some(appointment) = state.appointments.remove(&id) else {
            return Ok(None);
        };
        if appointment.status == AppointmentStatus::Upcoming {
            state.release(appointment.date, appointment.time);
        }
        Ok(Some(appointment))
    }

    async fn list_appointments(&self, user_id: Uuid) -> BookingResult<Vec<AppointmentDetails>> {
        let state = self.state.lock().await;
        let mut details: Vec<AppointmentDetails> = state
            .appointments
            .values()
            .filter(|a| a.user_id == user_id)
            .map(|a| AppointmentDetails {
                appointment: a.clone(),
                dog_name: state
                    .dogs
                    .get(&a.dog_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_default(),
                service_name: state
                    .services
                    .iter()
                    .find(|s| s.id == a.service_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        details.sort_by_key(|d| (d.appointment.date, d.appointment.time));
        Ok(details)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser, first_dog: Option<NewDog>) -> BookingResult<Option<User>> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == new_user.email) {
            return Ok(None);
        }

        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        if let Some(new_dog) = first_dog {
            let dog = Dog {
                id: Uuid::new_v4(),
                user_id: user.id,
                name: new_dog.name,
                breed: new_dog.breed,
                age: new_dog.age,
            };
            state.dogs.insert(dog.id, dog);
        }
        Ok(Some(user))
    }

    async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> BookingResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_dogs(&self, user_id: Uuid) -> BookingResult<Vec<Dog>> {
        let state = self.state.lock().await;
        let mut dogs: Vec<Dog> = state
            .dogs
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        dogs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dogs)
    }

    async fn get_dog(&self, id: Uuid) -> BookingResult<Option<Dog>> {
        let state = self.state.lock().await;
        Ok(state.dogs.get(&id).cloned())
    }

    async fn create_dog(&self, user_id: Uuid, new_dog: NewDog) -> BookingResult<Dog> {
        let mut state = self.state.lock().await;
        let dog = Dog {
            id: Uuid::new_v4(),
            user_id,
            name: new_dog.name,
            breed: new_dog.breed,
            age: new_dog.age,
        };
        state.dogs.insert(dog.id, dog.clone());
        Ok(dog)
    }

    async fn update_dog(&self, id: Uuid, changes: DogChanges) -> BookingResult<Option<Dog>> {
        let mut state = self.state.lock().await;
        Ok(state.dogs.get_mut(&id).map(|dog| {
            changes.apply(dog);
            dog.clone()
        }))
    }

    async fn delete_dog(&self, id: Uuid) -> BookingResult<DogRemoval> {
        let mut state = self.state.lock().await;
        if !state.dogs.contains_key(&id) {
            return Ok(DogRemoval::Missing);
        }
        if state.appointments.values().any(|a| a.dog_id == id) {
            return Ok(DogRemoval::InUse);
        }
        state.dogs.remove(&id);
        Ok(DogRemoval::Deleted)
    }
}

#[async_trait]
impl ServiceCatalog for MemoryStore {
    async fn list_services(&self) -> BookingResult<Vec<Service>> {
        let state = self.state.lock().await;
        let mut services = state.services.clone();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> BookingResult<Option<Service>> {
        let state = self.state.lock().await;
        Ok(state.services.iter().find(|s| s.id == id).cloned())
    }
}
