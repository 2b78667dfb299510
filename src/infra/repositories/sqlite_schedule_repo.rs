use crate::domain::models::schedule::{Blockout, DayRecord, DaySchedule, TimeSlot};
use crate::domain::ports::ScheduleRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn find_day(&self, date: NaiveDate) -> Result<Option<DaySchedule>, AppError> {
        let day = sqlx::query_as::<_, DayRecord>("SELECT * FROM day_schedules WHERE date = ?")
            .bind(date).fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        let Some(day) = day else { return Ok(None) };

        let time_slots = sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE day_date = ? ORDER BY start_time ASC")
            .bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let blockouts = sqlx::query_as::<_, Blockout>("SELECT * FROM blockouts WHERE day_date = ? ORDER BY start_time ASC")
            .bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        Ok(Some(DaySchedule { day, time_slots, blockouts }))
    }

    async fn create_day_if_absent(&self, day: &DayRecord, slots: &[TimeSlot]) -> Result<DaySchedule, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let inserted = sqlx::query(
            "INSERT INTO day_schedules (date, is_holiday, open_time, close_time, created_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(date) DO NOTHING"
        )
            .bind(day.date).bind(day.is_holiday).bind(&day.open_time).bind(&day.close_time).bind(day.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        // Only the transaction that won the insert seeds the slot template.
        if inserted.rows_affected() > 0 {
            for slot in slots {
                sqlx::query(
                    "INSERT INTO time_slots (day_date, start_time, end_time, max_bookings, current_bookings, booking_id) VALUES (?, ?, ?, ?, ?, ?)"
                )
                    .bind(slot.day_date).bind(&slot.start_time).bind(&slot.end_time)
                    .bind(slot.max_bookings).bind(slot.current_bookings).bind(&slot.booking_id)
                    .execute(&mut *tx).await.map_err(AppError::Database)?;
            }
        }
        tx.commit().await.map_err(AppError::Database)?;

        self.find_day(day.date).await?.ok_or(AppError::Internal)
    }

    async fn set_holiday(&self, date: NaiveDate, is_holiday: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE day_schedules SET is_holiday = ? WHERE date = ?")
            .bind(is_holiday).bind(date).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Day not found".into())); }
        Ok(())
    }

    async fn set_hours(&self, date: NaiveDate, open_time: &str, close_time: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE day_schedules SET open_time = ?, close_time = ? WHERE date = ?")
            .bind(open_time).bind(close_time).bind(date).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Day not found".into())); }
        Ok(())
    }

    async fn replace_open_slots(&self, date: NaiveDate, slots: &[TimeSlot]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM time_slots WHERE day_date = ? AND current_bookings = 0")
            .bind(date).execute(&mut *tx).await.map_err(AppError::Database)?;

        // Reserved slots survive the rebuild; a template slot at the same
        // start is skipped rather than overwritten.
        for slot in slots {
            sqlx::query(
                "INSERT INTO time_slots (day_date, start_time, end_time, max_bookings, current_bookings, booking_id) VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(day_date, start_time) DO NOTHING"
            )
                .bind(slot.day_date).bind(&slot.start_time).bind(&slot.end_time)
                .bind(slot.max_bookings).bind(slot.current_bookings).bind(&slot.booking_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)
    }

    async fn add_blockout(&self, blockout: &Blockout) -> Result<Blockout, AppError> {
        sqlx::query_as::<_, Blockout>(
            "INSERT INTO blockouts (id, day_date, start_time, end_time, reason) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&blockout.id).bind(blockout.day_date).bind(&blockout.start_time)
            .bind(&blockout.end_time).bind(&blockout.reason)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn remove_blockout(&self, date: NaiveDate, blockout_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blockouts WHERE day_date = ? AND id = ?")
            .bind(date).bind(blockout_id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Blockout not found".into())); }
        Ok(())
    }

    async fn reserve_slot(&self, date: NaiveDate, start_time: &str, booking_id: &str) -> Result<(), AppError> {
        // The availability check and the increment are one conditional
        // UPDATE, so racing requests cannot both take the last unit.
        let result = sqlx::query(
            "UPDATE time_slots
                SET current_bookings = current_bookings + 1, booking_id = ?
              WHERE day_date = ? AND start_time = ?
                AND current_bookings < max_bookings
                AND NOT EXISTS (SELECT 1 FROM day_schedules d WHERE d.date = time_slots.day_date AND d.is_holiday = 1)
                AND NOT EXISTS (SELECT 1 FROM blockouts b WHERE b.day_date = time_slots.day_date
                                AND b.start_time < time_slots.end_time AND b.end_time > time_slots.start_time)"
        )
            .bind(booking_id).bind(date).bind(start_time)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::SlotUnavailable(format!("Slot {} {} is not available", date, start_time)));
        }
        Ok(())
    }

    async fn release_slot(&self, date: NaiveDate, start_time: &str, booking_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE time_slots
                SET current_bookings = MAX(current_bookings - 1, 0), booking_id = NULL
              WHERE day_date = ? AND start_time = ? AND booking_id = ?"
        )
            .bind(date).bind(start_time).bind(booking_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::BookingMismatch(format!(
                "Booking {} does not occupy slot {} {}", booking_id, date, start_time
            )));
        }
        Ok(())
    }

    async fn force_release_slot(&self, date: NaiveDate, start_time: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE time_slots
                SET current_bookings = MAX(current_bookings - 1, 0), booking_id = NULL
              WHERE day_date = ? AND start_time = ? AND current_bookings > 0"
        )
            .bind(date).bind(start_time)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
