use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::config::Config;
use crate::domain::models::schedule::{Blockout, DayRecord, DaySchedule};
use crate::domain::ports::ScheduleRepository;
use crate::domain::services::slots::build_day_slots;
use crate::error::AppError;

/// Sole authority over whether a (date, start_time) slot can be reserved and
/// over slot occupancy transitions. All mutation goes through the repository's
/// atomic conditional updates; this service never does read-then-write on
/// occupancy counts.
pub struct AvailabilityManager {
    repo: Arc<dyn ScheduleRepository>,
    config: Config,
}

impl AvailabilityManager {
    pub fn new(repo: Arc<dyn ScheduleRepository>, config: Config) -> Self {
        Self { repo, config }
    }

    /// Fetch the schedule for a date, materializing it from the configured
    /// slot template on first touch. Days persist indefinitely once created.
    pub async fn day_schedule(&self, date: NaiveDate) -> Result<DaySchedule, AppError> {
        if let Some(day) = self.repo.find_day(date).await? {
            return Ok(day);
        }

        let record = DayRecord {
            date,
            is_holiday: false,
            open_time: self.config.open_time.clone(),
            close_time: self.config.close_time.clone(),
            created_at: Utc::now(),
        };
        let slots = build_day_slots(
            date,
            &record.open_time,
            &record.close_time,
            self.config.slot_duration_min,
            self.config.slot_capacity,
            &[],
        );

        info!("Materializing schedule for {} ({} slots)", date, slots.len());
        self.repo.create_day_if_absent(&record, &slots).await
    }

    /// Pure read. False when the day is a holiday, the slot does not exist,
    /// a blockout overlaps it, or the slot is full.
    pub async fn is_slot_available(&self, date: NaiveDate, start_time: &str) -> Result<bool, AppError> {
        let day = self.day_schedule(date).await?;
        Ok(day.is_start_available(start_time))
    }

    /// Occupy one unit of the slot's capacity on behalf of `booking_id`.
    /// Availability is re-validated inside the store's conditional update, so
    /// two racing reservations cannot both take the last unit.
    pub async fn reserve_slot(&self, date: NaiveDate, start_time: &str, booking_id: &str) -> Result<(), AppError> {
        self.day_schedule(date).await?;
        self.repo.reserve_slot(date, start_time, booking_id).await?;
        info!("Reserved slot {} {} for booking {}", date, start_time, booking_id);
        Ok(())
    }

    /// Release the unit held by `booking_id`. Fails with `BookingMismatch`
    /// when the slot's stored reference names a different booking.
    pub async fn cancel_slot(&self, date: NaiveDate, start_time: &str, booking_id: &str) -> Result<(), AppError> {
        self.repo.release_slot(date, start_time, booking_id).await?;
        info!("Released slot {} {} for booking {}", date, start_time, booking_id);
        Ok(())
    }

    /// Admin-only release that skips the reference guard. Needed on
    /// multi-capacity slots: the slot keeps a single scalar reference to the
    /// most recent booking, so earlier reservations cannot be matched by ref
    /// once it has been overwritten or cleared.
    pub async fn force_release_slot(&self, date: NaiveDate, start_time: &str) -> Result<(), AppError> {
        self.repo.force_release_slot(date, start_time).await
    }

    pub async fn set_holiday(&self, date: NaiveDate, is_holiday: bool) -> Result<DaySchedule, AppError> {
        self.day_schedule(date).await?;
        self.repo.set_holiday(date, is_holiday).await?;
        self.repo.find_day(date).await?.ok_or(AppError::Internal)
    }

    /// Override a single day's opening hours and rebuild its slot template.
    /// Slots holding reservations are never discarded.
    pub async fn set_special_hours(&self, date: NaiveDate, open_time: &str, close_time: &str) -> Result<DaySchedule, AppError> {
        let day = self.day_schedule(date).await?;
        self.repo.set_hours(date, open_time, close_time).await?;

        let slots = build_day_slots(
            date,
            open_time,
            close_time,
            self.config.slot_duration_min,
            self.config.slot_capacity,
            &day.blockouts,
        );
        self.repo.replace_open_slots(date, &slots).await?;
        self.repo.find_day(date).await?.ok_or(AppError::Internal)
    }

    /// Block out part of a day and drop the unreserved slots it covers.
    pub async fn add_blockout(&self, date: NaiveDate, start_time: String, end_time: String, reason: Option<String>) -> Result<DaySchedule, AppError> {
        let day = self.day_schedule(date).await?;
        let blockout = Blockout::new(date, start_time, end_time, reason);
        self.repo.add_blockout(&blockout).await?;

        let mut blockouts = day.blockouts.clone();
        blockouts.push(blockout);
        let slots = build_day_slots(
            date,
            &day.day.open_time,
            &day.day.close_time,
            self.config.slot_duration_min,
            self.config.slot_capacity,
            &blockouts,
        );
        self.repo.replace_open_slots(date, &slots).await?;
        self.repo.find_day(date).await?.ok_or(AppError::Internal)
    }

    pub async fn remove_blockout(&self, date: NaiveDate, blockout_id: &str) -> Result<DaySchedule, AppError> {
        let day = self.day_schedule(date).await?;
        self.repo.remove_blockout(date, blockout_id).await?;

        let blockouts: Vec<_> = day.blockouts.into_iter().filter(|b| b.id != blockout_id).collect();
        let slots = build_day_slots(
            date,
            &day.day.open_time,
            &day.day.close_time,
            self.config.slot_duration_min,
            self.config.slot_capacity,
            &blockouts,
        );
        self.repo.replace_open_slots(date, &slots).await?;
        self.repo.find_day(date).await?.ok_or(AppError::Internal)
    }
}
