use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use pawbook_core::{
    errors::BookingError,
    ledger::{populate, SlotPlan},
    models::{
        appointment::{AppointmentStatus, CancelOutcome, UpdateAppointmentRequest},
        dog::{DogRemoval, NewDog},
        user::NewUser,
    },
    scheduler::AppointmentScheduler,
    store::{AccountStore, ServiceCatalog, SlotLedger, Store},
};
use pawbook_db::MemoryStore;
use pretty_assertions::assert_eq;
use tokio::task::JoinSet;
use uuid::Uuid;

struct Salon {
    store: Arc<MemoryStore>,
    scheduler: AppointmentScheduler,
    owner: Uuid,
    dog: Uuid,
    service: Uuid,
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

async fn register(store: &MemoryStore, email: &str, dog: &str) -> (Uuid, Uuid) {
    let user = store
        .create_user(
            NewUser {
                full_name: "Test Owner".to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
            },
            Some(NewDog {
                name: dog.to_string(),
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

async fn salon() -> Salon {
    let store = Arc::new(MemoryStore::with_default_catalogue());
    populate(
        store.as_ref(),
        &SlotPlan {
            from_date: day(),
            num_days: 1,
            start_hour: 9,
            end_hour: 17,
            slot_duration_minutes: 30,
        },
    )
    .await
    .unwrap();

    let (owner, dog) = register(&store, "owner@example.com", "Biscuit").await;
    let service = store.list_services().await.unwrap().remove(0).id;
    let shared: Arc<dyn Store> = store.clone();

    Salon {
        scheduler: AppointmentScheduler::new(shared),
        store,
        owner,
        dog,
        service,
    }
}

#[tokio::test]
async fn booking_an_available_slot_takes_it() {
    let s = salon().await;

    let booked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "09:00")
        .await
        .unwrap();

    assert_eq!(booked.appointment.status, AppointmentStatus::Upcoming);
    assert_eq!(booked.appointment.time, at(9, 0));
    assert_eq!(booked.dog_name, "Biscuit");

    let slot = s.store.find_slot(day(), at(9, 0)).await.unwrap().unwrap();
    assert!(!slot.is_available);
}

#[tokio::test]
async fn booked_slot_disappears_from_listing() {
    let s = salon().await;
    assert_eq!(s.store.list_available(day()).await.unwrap().len(), 16);

    s.scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "09:00")
        .await
        .unwrap();

    let times: Vec<NaiveTime> = s
        .store
        .list_available(day())
        .await
        .unwrap()
        .into_iter()
        .map(|slot| slot.time_slot)
        .collect();
    assert_eq!(times.len(), 15);
    assert!(!times.contains(&at(9, 0)));
    assert_eq!(times.first(), Some(&at(9, 30)));
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn second_booking_of_the_same_slot_conflicts() {
    let s = salon().await;
    let (other, other_dog) = register(&s.store, "other@example.com", "Rex").await;

    s.scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "10:00")
        .await
        .unwrap();
    let err = s
        .scheduler
        .create(other, other_dog, s.service, "2024-01-01", "10:00:00")
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Conflict(_)));
}

#[tokio::test]
async fn unpopulated_slot_conflicts() {
    let s = salon().await;

    let err = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-02", "09:00")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));

    let err = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "17:00")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));
}

#[tokio::test]
async fn foreign_dog_and_unknown_service_are_not_found() {
    let s = salon().await;
    let (_, other_dog) = register(&s.store, "other@example.com", "Rex").await;

    let err = s
        .scheduler
        .create(s.owner, other_dog, s.service, "2024-01-01", "09:00")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));

    let err = s
        .scheduler
        .create(s.owner, s.dog, Uuid::new_v4(), "2024-01-01", "09:00")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn malformed_date_or_time_is_invalid_input() {
    let s = salon().await;

    for (date, time) in [("2024/01/01", "09:00"), ("2024-01-01", "nine"), ("", "")] {
        let err = s
            .scheduler
            .create(s.owner, s.dog, s.service, date, time)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)), "{date} {time}");
    }
    assert_eq!(s.store.list_available(day()).await.unwrap().len(), 16);
}

#[tokio::test]
async fn cancelling_releases_the_slot_for_rebooking() {
    let s = salon().await;
    let booked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "11:30")
        .await
        .unwrap();

    let outcome = s.scheduler.cancel(booked.appointment.id, s.owner).await.unwrap();
    assert!(matches!(outcome, CancelOutcome::Cancelled(_)));
    assert_eq!(outcome.appointment().status, AppointmentStatus::Cancelled);
    assert!(s.store.find_slot(day(), at(11, 30)).await.unwrap().unwrap().is_available);

    let rebooked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "11:30")
        .await
        .unwrap();
    assert_ne!(rebooked.appointment.id, booked.appointment.id);
}

#[tokio::test]
async fn cancelling_twice_is_a_no_op() {
    let s = salon().await;
    let booked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "12:00")
        .await
        .unwrap();
    s.scheduler.cancel(booked.appointment.id, s.owner).await.unwrap();

    // Someone else takes the released slot; a repeat cancel must not free it.
    let (other, other_dog) = register(&s.store, "other@example.com", "Rex").await;
    s.scheduler
        .create(other, other_dog, s.service, "2024-01-01", "12:00")
        .await
        .unwrap();

    let outcome = s.scheduler.cancel(booked.appointment.id, s.owner).await.unwrap();
    assert!(matches!(outcome, CancelOutcome::AlreadyCancelled(_)));
    assert!(!s.store.find_slot(day(), at(12, 0)).await.unwrap().unwrap().is_available);
}

#[tokio::test]
async fn cancelling_someone_elses_appointment_is_not_found() {
    let s = salon().await;
    let (other, _) = register(&s.store, "other@example.com", "Rex").await;
    let booked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "13:00")
        .await
        .unwrap();

    let err = s.scheduler.cancel(booked.appointment.id, other).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
    let err = s.scheduler.delete(booked.appointment.id, other).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));
    let err = s.scheduler.cancel(Uuid::new_v4(), s.owner).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));

    assert!(!s.store.find_slot(day(), at(13, 0)).await.unwrap().unwrap().is_available);
}

#[tokio::test]
async fn deleting_releases_the_slot_and_removes_the_record() {
    let s = salon().await;
    let keep = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "14:00")
        .await
        .unwrap();
    let gone = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "09:00")
        .await
        .unwrap();

    s.scheduler.delete(gone.appointment.id, s.owner).await.unwrap();

    assert!(s.store.find_slot(day(), at(9, 0)).await.unwrap().unwrap().is_available);
    let listed: Vec<Uuid> = s
        .scheduler
        .list_for(s.owner)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.appointment.id)
        .collect();
    assert_eq!(listed, vec![keep.appointment.id]);
}

#[tokio::test]
async fn deleting_a_cancelled_appointment_leaves_a_rebooked_slot_alone() {
    let s = salon().await;
    let first = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "15:00")
        .await
        .unwrap();
    s.scheduler.cancel(first.appointment.id, s.owner).await.unwrap();
    s.scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "15:00")
        .await
        .unwrap();

    s.scheduler.delete(first.appointment.id, s.owner).await.unwrap();

    assert!(!s.store.find_slot(day(), at(15, 0)).await.unwrap().unwrap().is_available);
}

#[tokio::test]
async fn missing_slot_is_recreated_on_release() {
    let s = salon().await;
    let booked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "16:30")
        .await
        .unwrap();
    s.store.remove_slot(day(), at(16, 30)).await.unwrap();

    s.scheduler.cancel(booked.appointment.id, s.owner).await.unwrap();

    let slot = s.store.find_slot(day(), at(16, 30)).await.unwrap().unwrap();
    assert!(slot.is_available);
}

#[tokio::test]
async fn listing_is_ordered_by_date_then_time() {
    let s = salon().await;
    populate(
        s.store.as_ref(),
        &SlotPlan {
            from_date: day(),
            num_days: 2,
            start_hour: 9,
            end_hour: 17,
            slot_duration_minutes: 30,
        },
    )
    .await
    .unwrap();

    for (date, time) in [("2024-01-02", "09:00"), ("2024-01-01", "16:00"), ("2024-01-01", "10:00")] {
        s.scheduler
            .create(s.owner, s.dog, s.service, date, time)
            .await
            .unwrap();
    }

    let order: Vec<(NaiveDate, NaiveTime)> = s
        .scheduler
        .list_for(s.owner)
        .await
        .unwrap()
        .into_iter()
        .map(|d| (d.appointment.date, d.appointment.time))
        .collect();
    assert_eq!(
        order,
        vec![
            (day(), at(10, 0)),
            (day(), at(16, 0)),
            (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), at(9, 0)),
        ]
    );
}

#[tokio::test]
async fn update_only_supports_cancellation() {
    let s = salon().await;
    let booked = s
        .scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "09:30")
        .await
        .unwrap();
    let id = booked.appointment.id;

    for status in [None, Some("upcoming"), Some("rescheduled")] {
        let request = UpdateAppointmentRequest {
            status: status.map(str::to_string),
        };
        let err = s.scheduler.update(id, s.owner, &request).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)), "{status:?}");
    }

    let cancel = UpdateAppointmentRequest {
        status: Some("cancelled".to_string()),
    };
    let err = s.scheduler.update(Uuid::new_v4(), s.owner, &cancel).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound(_)));

    let outcome = s.scheduler.update(id, s.owner, &cancel).await.unwrap();
    assert!(matches!(outcome, CancelOutcome::Cancelled(_)));
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn racing_bookings_produce_exactly_one_winner() {
    let s = salon().await;
    let mut contenders = Vec::new();
    for i in 0..8 {
        contenders.push(register(&s.store, &format!("racer{i}@example.com"), "Dash").await);
    }

    let mut races = JoinSet::new();
    for &(owner, dog) in &contenders {
        let scheduler = s.scheduler.clone();
        let service = s.service;
        races.spawn(async move {
            scheduler
                .create(owner, dog, service, "2024-01-01", "10:30")
                .await
        });
    }

    let mut winners = 0;
    let mut conflicts = 0;
    while let Some(result) = races.join_next().await {
        match result.unwrap() {
            Ok(_) => winners += 1,
            Err(BookingError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);
    assert!(!s.store.find_slot(day(), at(10, 30)).await.unwrap().unwrap().is_available);

    let mut holders = 0;
    for &(owner, _) in &contenders {
        holders += s
            .scheduler
            .list_for(owner)
            .await
            .unwrap()
            .iter()
            .filter(|d| {
                d.appointment.time == at(10, 30)
                    && d.appointment.status == AppointmentStatus::Upcoming
            })
            .count();
    }
    assert_eq!(holders, 1);
}

#[tokio::test]
async fn dog_deletion_reports_what_happened() {
    let s = salon().await;
    let (_, idle) = register(&s.store, "idle@example.com", "Nap").await;

    s.scheduler
        .create(s.owner, s.dog, s.service, "2024-01-01", "11:00")
        .await
        .unwrap();

    assert_eq!(s.store.delete_dog(s.dog).await.unwrap(), DogRemoval::InUse);
    assert!(s.store.get_dog(s.dog).await.unwrap().is_some());

    assert_eq!(s.store.delete_dog(idle).await.unwrap(), DogRemoval::Deleted);
    assert_eq!(s.store.delete_dog(idle).await.unwrap(), DogRemoval::Missing);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn deleting_a_dog_while_it_is_booked_never_orphans_the_appointment() {
    let s = salon().await;
    let times = ["09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30"];

    for (i, time) in times.into_iter().enumerate() {
        let (owner, dog) = register(&s.store, &format!("pair{i}@example.com"), "Dash").await;

        let store = s.store.clone();
        let removal = tokio::spawn(async move { store.delete_dog(dog).await });
        let scheduler = s.scheduler.clone();
        let service = s.service;
        let booking = tokio::spawn(async move {
            scheduler.create(owner, dog, service, "2024-01-01", time).await
        });

        let removal = removal.await.unwrap().unwrap();
        let booking = booking.await.unwrap();
        match (removal, booking) {
            (DogRemoval::InUse, Ok(_)) => {}
            (DogRemoval::Deleted, Err(BookingError::NotFound(_))) => {}
            other => panic!("inconsistent outcome for {time}: {other:?}"),
        }

        for details in s.scheduler.list_for(owner).await.unwrap() {
            assert!(s.store.get_dog(details.appointment.dog_id).await.unwrap().is_some());
        }
    }
}
