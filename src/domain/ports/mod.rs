use crate::domain::models::{
    booking::Booking,
    loyalty::{LedgerEntry, LoyaltyAccount},
    schedule::{Blockout, DayRecord, DaySchedule, TimeSlot},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Persistence contract for day schedules. `reserve` and `release` must be
/// single atomic conditional updates against the store; a read followed by a
/// separate write is not an acceptable implementation.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find_day(&self, date: NaiveDate) -> Result<Option<DaySchedule>, AppError>;
    /// Insert a day and its slots if the date is not present yet; returns the
    /// stored day either way. Safe under concurrent first-touch of a date.
    async fn create_day_if_absent(&self, day: &DayRecord, slots: &[TimeSlot]) -> Result<DaySchedule, AppError>;
    async fn set_holiday(&self, date: NaiveDate, is_holiday: bool) -> Result<(), AppError>;
    async fn set_hours(&self, date: NaiveDate, open_time: &str, close_time: &str) -> Result<(), AppError>;
    /// Drop all slots without reservations and insert the given ones where no
    /// slot with the same start exists. Reserved slots are never discarded.
    async fn replace_open_slots(&self, date: NaiveDate, slots: &[TimeSlot]) -> Result<(), AppError>;
    async fn add_blockout(&self, blockout: &Blockout) -> Result<Blockout, AppError>;
    async fn remove_blockout(&self, date: NaiveDate, blockout_id: &str) -> Result<(), AppError>;
    /// Atomic occupy: increments `current_bookings` and stamps `booking_id`
    /// only if the slot exists, has spare capacity, the day is not a holiday
    /// and no blockout overlaps. Fails with `SlotUnavailable` otherwise.
    async fn reserve_slot(&self, date: NaiveDate, start_time: &str, booking_id: &str) -> Result<(), AppError>;
    /// Atomic release guarded on the stored booking reference. Fails with
    /// `BookingMismatch` when the slot is not held by `booking_id`.
    async fn release_slot(&self, date: NaiveDate, start_time: &str, booking_id: &str) -> Result<(), AppError>;
    /// Unguarded decrement, floored at zero. Admin-only escape hatch for
    /// multi-capacity slots whose scalar reference no longer names the
    /// booking being cancelled.
    async fn force_release_slot(&self, date: NaiveDate, start_time: &str) -> Result<(), AppError>;
}

/// Persistence contract for the loyalty ledger. Both operations append the
/// entry and apply the balance change in one transaction; `debit` is guarded
/// so the balance can never go below zero.
#[async_trait]
pub trait LoyaltyRepository: Send + Sync {
    async fn find_account(&self, user_id: &str) -> Result<Option<LoyaltyAccount>, AppError>;
    async fn list_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError>;
    /// Apply an entry with positive `points`. Creates the account on first
    /// credit. Returns the updated account with its tier already recomputed.
    async fn credit(&self, entry: &LedgerEntry) -> Result<LoyaltyAccount, AppError>;
    /// Apply an entry with negative `points`, atomically guarded on
    /// `points >= -entry.points`. Fails with `InsufficientPoints` and leaves
    /// the account untouched when the balance does not cover it.
    async fn debit(&self, entry: &LedgerEntry) -> Result<LoyaltyAccount, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn set_status(&self, id: &str, status: &str) -> Result<Booking, AppError>;
}
