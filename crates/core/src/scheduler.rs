//! # Appointment Scheduler
//!
//! Creates, cancels and deletes appointments while keeping the slot ledger in
//! step: a slot is unavailable exactly while an upcoming appointment holds it.
//! The paired appointment/slot writes are delegated to
//! [`AppointmentStore`](crate::store::AppointmentStore), which applies them
//! atomically; this module owns validation, ownership checks and error
//! classification.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::ledger::{parse_date, parse_time};
use crate::models::appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, CancelOutcome, NewAppointment,
    UpdateAppointmentRequest,
};
use crate::store::Store;

#[derive(Clone)]
pub struct AppointmentScheduler {
    store: Arc<dyn Store>,
}

impl AppointmentScheduler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Books `date` at `time` for the owner's dog.
    ///
    /// # Errors
    ///
    /// * `NotFound` - the dog does not belong to `owner`, or the service is unknown
    /// * `Validation` - `date` or `time` is malformed
    /// * `Conflict` - no available slot at that date and time
    /// * `Database` - the booking could not be committed; nothing was written
    pub async fn create(
        &self,
        owner: Uuid,
        dog_id: Uuid,
        service_id: Uuid,
        date: &str,
        time: &str,
    ) -> BookingResult<AppointmentDetails> {
        let dog = self
            .store
            .get_dog(dog_id)
            .await?
            .filter(|dog| dog.user_id == owner)
            .ok_or_else(|| {
                BookingError::NotFound("Dog not found or does not belong to user".to_string())
            })?;

        let service = self
            .store
            .get_service(service_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Service not found".to_string()))?;

        let date = parse_date(date)?;
        let time = parse_time(time)?;

        let appointment = self
            .store
            .book(NewAppointment {
                user_id: owner,
                dog_id: dog.id,
                service_id: service.id,
                date,
                time,
            })
            .await?
            .ok_or_else(|| BookingError::Conflict("Selected slot is not available".to_string()))?;

        info!(
            "Booked appointment {} for {} on {} at {}",
            appointment.id, dog.name, date, time
        );

        Ok(AppointmentDetails {
            appointment,
            dog_name: dog.name,
            service_name: service.name,
        })
    }

    /// Cancels an upcoming appointment and releases its slot. Cancelling an
    /// already-cancelled appointment succeeds without changing anything.
    pub async fn cancel(&self, appointment_id: Uuid, owner: Uuid) -> BookingResult<CancelOutcome> {
        let outcome = self
            .store
            .cancel_appointment(appointment_id, owner)
            .await?
            .ok_or_else(not_found)?;

        match &outcome {
            CancelOutcome::Cancelled(appointment) => info!(
                "Cancelled appointment {}, released {} {}",
                appointment.id, appointment.date, appointment.time
            ),
            CancelOutcome::AlreadyCancelled(appointment) => {
                debug!("Appointment {} was already cancelled", appointment.id)
            }
        }
        Ok(outcome)
    }

    /// Removes an appointment record, releasing its slot first.
    pub async fn delete(&self, appointment_id: Uuid, owner: Uuid) -> BookingResult<Appointment> {
        let appointment = self
            .store
            .delete_appointment(appointment_id, owner)
            .await?
            .ok_or_else(not_found)?;

        info!("Deleted appointment {}", appointment.id);
        Ok(appointment)
    }

    pub async fn list_for(&self, owner: Uuid) -> BookingResult<Vec<AppointmentDetails>> {
        self.store.list_appointments(owner).await
    }

    /// Applies a client-requested change. Cancellation is the only supported one.
    pub async fn update(
        &self,
        appointment_id: Uuid,
        owner: Uuid,
        request: &UpdateAppointmentRequest,
    ) -> BookingResult<CancelOutcome> {
        // Ownership is checked before the request shape so that a foreign id
        // answers NotFound regardless of the body.
        if self.store.get_appointment(appointment_id, owner).await?.is_none() {
            return Err(not_found());
        }

        match request.status.as_deref().map(str::parse::<AppointmentStatus>) {
            Some(Ok(AppointmentStatus::Cancelled)) => self.cancel(appointment_id, owner).await,
            _ => Err(BookingError::Validation(
                "Invalid update request. Only status='cancelled' is supported".to_string(),
            )),
        }
    }
}

fn not_found() -> BookingError {
    BookingError::NotFound("Appointment not found or access forbidden".to_string())
}
