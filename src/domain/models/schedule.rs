use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One calendar date's bookable capacity. Created lazily the first time a
/// date is queried or booked, persisted indefinitely as historical record.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub open_time: String,
    pub close_time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TimeSlot {
    pub day_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub max_bookings: i32,
    pub current_bookings: i32,
    pub booking_id: Option<String>,
}

impl TimeSlot {
    /// Availability is always derived, never stored. `current_bookings` and
    /// `max_bookings` are the single source of truth.
    pub fn is_available(&self) -> bool {
        self.current_bookings < self.max_bookings
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Blockout {
    pub id: String,
    pub day_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}

impl Blockout {
    pub fn new(day_date: NaiveDate, start_time: String, end_time: String, reason: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day_date,
            start_time,
            end_time,
            reason,
        }
    }

    /// Half-open interval overlap on zero-padded "HH:MM" strings, which order
    /// lexicographically the same as the times they denote.
    pub fn overlaps(&self, start: &str, end: &str) -> bool {
        self.start_time.as_str() < end && self.end_time.as_str() > start
    }
}

/// A full day as the API exposes it: the day record plus its ordered slots
/// and blockouts.
#[derive(Debug, Clone)]
pub struct DaySchedule {
    pub day: DayRecord,
    pub time_slots: Vec<TimeSlot>,
    pub blockouts: Vec<Blockout>,
}

impl DaySchedule {
    pub fn slot(&self, start_time: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.start_time == start_time)
    }

    pub fn is_blocked(&self, start: &str, end: &str) -> bool {
        self.blockouts.iter().any(|b| b.overlaps(start, end))
    }

    /// False on a holiday, an unknown start time, a blockout overlap, or a
    /// full slot.
    pub fn is_start_available(&self, start_time: &str) -> bool {
        if self.day.is_holiday {
            return false;
        }
        match self.slot(start_time) {
            Some(slot) => slot.is_available() && !self.is_blocked(&slot.start_time, &slot.end_time),
            None => false,
        }
    }
}
