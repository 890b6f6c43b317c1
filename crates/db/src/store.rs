//! PostgreSQL implementation of the core storage traits.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use pawbook_core::{
    errors::{BookingError, BookingResult},
    models::{
        appointment::{Appointment, AppointmentDetails, CancelOutcome, NewAppointment},
        dog::{Dog, DogChanges, DogRemoval, NewDog},
        service::Service,
        slot::Slot,
        user::{NewUser, User},
    },
    store::{AccountStore, AppointmentStore, ServiceCatalog, SlotLedger},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::repositories::{
    appointment::{self, CancelRow},
    availability, dog, is_foreign_key_violation, service, user,
};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SlotLedger for PgStore {
    async fn has_slots_on(&self, date: NaiveDate) -> BookingResult<bool> {
        availability::slots_exist_on(&self.pool, date)
            .await
            .map_err(BookingError::Database)
    }

    async fn insert_slots(&self, date: NaiveDate, times: &[NaiveTime]) -> BookingResult<u64> {
        debug!("Inserting {} slots on {}", times.len(), date);
        availability::insert_slots(&self.pool, date, times)
            .await
            .map_err(BookingError::Database)
    }

    async fn list_available(&self, date: NaiveDate) -> BookingResult<Vec<Slot>> {
        let slots = availability::list_available(&self.pool, date)
            .await
            .map_err(BookingError::Database)?;
        Ok(slots.into_iter().map(Slot::from).collect())
    }

    async fn find_slot(&self, date: NaiveDate, time: NaiveTime) -> BookingResult<Option<Slot>> {
        let slot = availability::find_slot(&self.pool, date, time)
            .await
            .map_err(BookingError::Database)?;
        Ok(slot.map(Slot::from))
    }

    async fn set_available(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> BookingResult<Slot> {
        let slot = availability::set_slot_available(&self.pool, date, time, available)
            .await
            .map_err(BookingError::Database)?;
        if slot.inserted {
            warn!("Slot {} {} was missing; recreated it", date, time);
        }
        Ok(slot.into())
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn book(&self, new: NewAppointment) -> BookingResult<Option<Appointment>> {
        let row = match appointment::book_appointment(&self.pool, &new).await {
            Ok(row) => row,
            // The dog was deleted after the scheduler looked it up
            Err(report) if is_foreign_key_violation(&report) => return Err(dog_vanished()),
            Err(report) => return Err(BookingError::Database(report)),
        };
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn get_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>> {
        let row = appointment::get_appointment_for_user(&self.pool, id, user_id)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn cancel_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<CancelOutcome>> {
        let outcome = match appointment::cancel_appointment(&self.pool, id, user_id)
            .await
            .map_err(BookingError::Database)?
        {
            Some(CancelRow::Cancelled(row)) => Some(CancelOutcome::Cancelled(row.try_into()?)),
            Some(CancelRow::AlreadyCancelled(row)) => {
                Some(CancelOutcome::AlreadyCancelled(row.try_into()?))
            }
            None => None,
        };
        Ok(outcome)
    }

    async fn delete_appointment(&self, id: Uuid, user_id: Uuid) -> BookingResult<Option<Appointment>> {
        let row = appointment::delete_appointment(&self.pool, id, user_id)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn list_appointments(&self, user_id: Uuid) -> BookingResult<Vec<AppointmentDetails>> {
        let rows = appointment::list_appointments_for_user(&self.pool, user_id)
            .await
            .map_err(BookingError::Database)?;
        let details = rows
            .into_iter()
            .map(AppointmentDetails::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(details)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_user(&self, new_user: NewUser, first_dog: Option<NewDog>) -> BookingResult<Option<User>> {
        let registered = user::register_user(&self.pool, &new_user, first_dog.as_ref())
            .await
            .map_err(BookingError::Database)?;
        Ok(registered.map(|(user, _)| user.into()))
    }

    async fn get_user(&self, id: Uuid) -> BookingResult<Option<User>> {
        let row = user::get_user_by_id(&self.pool, id)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> BookingResult<Option<User>> {
        let row = user::get_user_by_email(&self.pool, email)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(User::from))
    }

    async fn list_dogs(&self, user_id: Uuid) -> BookingResult<Vec<Dog>> {
        let rows = dog::get_dogs_by_user_id(&self.pool, user_id)
            .await
            .map_err(BookingError::Database)?;
        Ok(rows.into_iter().map(Dog::from).collect())
    }

    async fn get_dog(&self, id: Uuid) -> BookingResult<Option<Dog>> {
        let row = dog::get_dog_by_id(&self.pool, id)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(Dog::from))
    }

    async fn create_dog(&self, user_id: Uuid, new_dog: NewDog) -> BookingResult<Dog> {
        let row = dog::insert_dog(&self.pool, user_id, &new_dog)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.into())
    }

    async fn update_dog(&self, id: Uuid, changes: DogChanges) -> BookingResult<Option<Dog>> {
        let row = dog::update_dog(&self.pool, id, &changes)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(Dog::from))
    }

    async fn delete_dog(&self, id: Uuid) -> BookingResult<DogRemoval> {
        dog::delete_dog(&self.pool, id)
            .await
            .map_err(BookingError::Database)
    }
}

#[async_trait]
impl ServiceCatalog for PgStore {
    async fn list_services(&self) -> BookingResult<Vec<Service>> {
        let rows = service::list_services(&self.pool)
            .await
            .map_err(BookingError::Database)?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn get_service(&self, id: Uuid) -> BookingResult<Option<Service>> {
        let row = service::get_service_by_id(&self.pool, id)
            .await
            .map_err(BookingError::Database)?;
        Ok(row.map(Service::from))
    }
}

fn dog_vanished() -> BookingError {
    BookingError::NotFound("Dog not found or does not belong to user".to_string())
}

#[cfg(test)]
mod tests {
    //! These run against a real PostgreSQL named by `TEST_DATABASE_URL`.

    use super::*;
    use crate::mock::create_test_pool;
    use crate::repositories::{is_foreign_key_violation, is_unique_violation};
    use pawbook_core::{
        ledger::{populate, SlotPlan},
        scheduler::AppointmentScheduler,
        store::Store,
    };
    use std::sync::Arc;

    async fn fresh_owner(store: &PgStore) -> (Uuid, Uuid) {
        let user = store
            .create_user(
                NewUser {
                    full_name: "Race Owner".to_string(),
                    email: format!("{}@example.com", Uuid::new_v4()),
                    password_hash: "hash".to_string(),
                },
                Some(NewDog {
                    name: "Dash".to_string(),
                    breed: None,
                    age: None,
                }),
            )
            .await
            .unwrap()
            .unwrap();
        let dog = store.list_dogs(user.id).await.unwrap().remove(0);
        (user.id, dog.id)
    }

    #[tokio::test]
    async fn concurrent_bookings_on_postgres_have_one_winner() {
        let Some(pool) = create_test_pool().await else {
            return;
        };
        crate::schema::populate_services(&pool).await.unwrap();
        let store = PgStore::new(pool);

        // A far-future day nobody else touches.
        let date = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap()
            + chrono::Days::new(u64::from(rand_day()));
        populate(
            &store,
            &SlotPlan {
                from_date: date,
                num_days: 1,
                start_hour: 9,
                end_hour: 10,
                slot_duration_minutes: 30,
            },
        )
        .await
        .unwrap();
        let service = store.list_services().await.unwrap().remove(0).id;

        let mut contenders = Vec::new();
        for _ in 0..4 {
            contenders.push(fresh_owner(&store).await);
        }
        let shared: Arc<dyn Store> = Arc::new(store.clone());
        let scheduler = AppointmentScheduler::new(shared);

        let mut races = tokio::task::JoinSet::new();
        for (owner, dog) in contenders {
            let scheduler = scheduler.clone();
            let date = date.format("%Y-%m-%d").to_string();
            races.spawn(async move { scheduler.create(owner, dog, service, &date, "09:00").await });
        }

        let mut winners = 0;
        while let Some(result) = races.join_next().await {
            match result.unwrap() {
                Ok(_) => winners += 1,
                Err(BookingError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(winners, 1);

        let slot = store
            .find_slot(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!slot.is_available);
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_none() {
        let Some(pool) = create_test_pool().await else {
            return;
        };
        let store = PgStore::new(pool);
        let email = format!("{}@example.com", Uuid::new_v4());
        let new_user = NewUser {
            full_name: "Twice".to_string(),
            email,
            password_hash: "hash".to_string(),
        };

        assert!(store.create_user(new_user.clone(), None).await.unwrap().is_some());
        assert!(store.create_user(new_user, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dog_with_appointments_is_kept_on_postgres() {
        let Some(pool) = create_test_pool().await else {
            return;
        };
        crate::schema::populate_services(&pool).await.unwrap();
        let store = PgStore::new(pool);

        let date = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap()
            + chrono::Days::new(u64::from(rand_day()));
        store
            .insert_slots(date, &[NaiveTime::from_hms_opt(9, 0, 0).unwrap()])
            .await
            .unwrap();
        let service = store.list_services().await.unwrap().remove(0).id;
        let (owner, dog) = fresh_owner(&store).await;
        let (_, idle) = fresh_owner(&store).await;

        let scheduler = AppointmentScheduler::new(Arc::new(store.clone()));
        let date_text = date.format("%Y-%m-%d").to_string();
        scheduler
            .create(owner, dog, service, &date_text, "09:00")
            .await
            .unwrap();

        assert_eq!(store.delete_dog(dog).await.unwrap(), DogRemoval::InUse);
        assert!(store.get_dog(dog).await.unwrap().is_some());
        assert_eq!(store.delete_dog(idle).await.unwrap(), DogRemoval::Deleted);
        assert_eq!(store.delete_dog(idle).await.unwrap(), DogRemoval::Missing);
    }

    #[tokio::test]
    async fn released_slot_is_recreated_on_postgres() {
        let Some(pool) = create_test_pool().await else {
            return;
        };
        let store = PgStore::new(pool);
        let date = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap()
            + chrono::Days::new(u64::from(rand_day()));
        let time = NaiveTime::from_hms_opt(16, 30, 0).unwrap();

        assert!(store.find_slot(date, time).await.unwrap().is_none());
        let slot = store.set_available(date, time, true).await.unwrap();
        assert!(slot.is_available);

        let slot = store.set_available(date, time, false).await.unwrap();
        assert!(!slot.is_available);
        assert_eq!(store.list_available(date).await.unwrap(), Vec::new());
    }

    #[test]
    fn plain_reports_are_not_constraint_violations() {
        assert!(!is_unique_violation(&eyre::eyre!("duplicate key value")));
        assert!(!is_foreign_key_violation(&eyre::eyre!("violates foreign key constraint")));
    }

    fn rand_day() -> u32 {
        Uuid::new_v4().as_u128() as u32 % 30_000
    }
}
