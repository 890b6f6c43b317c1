//! # Slot Ledger
//!
//! Population and lookup of bookable slots. Each calendar day is split into
//! fixed-length slots between an opening and a closing hour; population is
//! append-only per day, so re-running it over a populated day is a no-op.

use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::errors::{BookingError, BookingResult};
use crate::models::slot::Slot;
use crate::store::SlotLedger;

/// Which days to populate and how to carve up the working hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPlan {
    pub from_date: NaiveDate,
    pub num_days: u32,
    /// First slot starts at `start_hour:00`.
    pub start_hour: u32,
    /// Exclusive: no slot starts at or after `end_hour:00`.
    pub end_hour: u32,
    pub slot_duration_minutes: u32,
}

impl SlotPlan {
    pub fn validate(&self) -> BookingResult<()> {
        if self.slot_duration_minutes == 0 {
            return Err(BookingError::Validation(
                "Slot duration must be at least one minute".to_string(),
            ));
        }
        if self.end_hour > 24 {
            return Err(BookingError::Validation(format!(
                "End hour {} is past the end of the day",
                self.end_hour
            )));
        }
        if self.start_hour >= self.end_hour {
            return Err(BookingError::Validation(format!(
                "Start hour {} must be before end hour {}",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }

    /// Slot start times for a single day.
    pub fn times(&self) -> Vec<NaiveTime> {
        let step = self.slot_duration_minutes.max(1) as usize;
        (self.start_hour * 60..self.end_hour.min(24) * 60)
            .step_by(step)
            .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
            .collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.num_days).filter_map(|offset| {
            self.from_date.checked_add_days(Days::new(u64::from(offset)))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub populated: Vec<NaiveDate>,
    pub skipped: Vec<NaiveDate>,
    pub slots_created: u64,
}

/// Creates slots for every day in the plan that has none yet.
pub async fn populate<L>(ledger: &L, plan: &SlotPlan) -> BookingResult<PopulateReport>
where
    L: SlotLedger + ?Sized,
{
    plan.validate()?;
    let times = plan.times();
    let mut report = PopulateReport::default();

    for date in plan.dates() {
        if ledger.has_slots_on(date).await? {
            info!("Availability for {} already exists. Skipping.", date);
            report.skipped.push(date);
            continue;
        }
        let created = ledger.insert_slots(date, &times).await?;
        debug!("Created {} slots on {}", created, date);
        report.slots_created += created;
        report.populated.push(date);
    }

    info!(
        "Availability populated for {} of {} days from {}",
        report.populated.len(),
        plan.num_days,
        plan.from_date
    );
    Ok(report)
}

/// Available slots for a date given as `YYYY-MM-DD`.
pub async fn available_on<L>(ledger: &L, date: &str) -> BookingResult<Vec<Slot>>
where
    L: SlotLedger + ?Sized,
{
    let date = parse_date(date)?;
    ledger.list_available(date).await
}

pub fn parse_date(input: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        BookingError::Validation("Invalid date format. Use YYYY-MM-DD".to_string())
    })
}

/// Accepts `HH:MM` and `HH:MM:SS`; slot listings render the latter and
/// clients post it straight back.
pub fn parse_time(input: &str) -> BookingResult<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| BookingError::Validation("Invalid time format. Use HH:MM".to_string()))
}
