use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One bookable start time on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_slot: NaiveTime,
    pub is_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotResponse {
    pub id: Uuid,
    pub date: String,
    pub time_slot: String,
    pub is_available: bool,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id,
            date: slot.date.format("%Y-%m-%d").to_string(),
            time_slot: slot.time_slot.format("%H:%M:%S").to_string(),
            is_available: slot.is_available,
        }
    }
}
