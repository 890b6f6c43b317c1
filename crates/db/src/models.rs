use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{eyre, Report};
use pawbook_core::models::{
    appointment::{Appointment, AppointmentDetails},
    dog::Dog,
    service::Service,
    slot::Slot,
    user::User,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_slot: NaiveTime,
    pub is_available: bool,
}

/// A slot row returned from an upsert, flagged when the row had to be created.
#[derive(Debug, Clone, FromRow)]
pub struct DbSlotWrite {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_slot: NaiveTime,
    pub is_available: bool,
    pub inserted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dog_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dog_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
    pub dog_name: String,
    pub service_name: String,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

impl From<DbDog> for Dog {
    fn from(row: DbDog) -> Self {
        Dog {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            breed: row.breed,
            age: row.age,
        }
    }
}

impl From<DbService> for Service {
    fn from(row: DbService) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
        }
    }
}

impl From<DbSlot> for Slot {
    fn from(row: DbSlot) -> Self {
        Slot {
            id: row.id,
            date: row.date,
            time_slot: row.time_slot,
            is_available: row.is_available,
        }
    }
}

impl From<DbSlotWrite> for Slot {
    fn from(row: DbSlotWrite) -> Self {
        Slot {
            id: row.id,
            date: row.date,
            time_slot: row.time_slot,
            is_available: row.is_available,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = Report;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            user_id: row.user_id,
            dog_id: row.dog_id,
            service_id: row.service_id,
            date: row.date,
            time: row.time,
            status: row.status.parse().map_err(|e| eyre!("appointment {}: {}", row.id, e))?,
        })
    }
}

impl TryFrom<DbAppointmentDetails> for AppointmentDetails {
    type Error = Report;

    fn try_from(row: DbAppointmentDetails) -> Result<Self, Self::Error> {
        Ok(AppointmentDetails {
            appointment: Appointment {
                id: row.id,
                user_id: row.user_id,
                dog_id: row.dog_id,
                service_id: row.service_id,
                date: row.date,
                time: row.time,
                status: row.status.parse().map_err(|e| eyre!("appointment {}: {}", row.id, e))?,
            },
            dog_name: row.dog_name,
            service_name: row.service_name,
        })
    }
}
