use crate::domain::models::booking::Booking;
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, customer_id, customer_name, customer_email, vehicle, service, address, date, start_time, price, status, management_token, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.customer_id).bind(&booking.customer_name).bind(&booking.customer_email)
            .bind(&booking.vehicle).bind(&booking.service).bind(&booking.address).bind(booking.date)
            .bind(&booking.start_time).bind(booking.price).bind(&booking.status)
            .bind(&booking.management_token).bind(&booking.notes).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE management_token = ?")
            .bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE customer_id = ? ORDER BY date ASC, start_time ASC")
            .bind(customer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE date = ? ORDER BY start_time ASC")
            .bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = ? WHERE id = ? RETURNING *")
            .bind(status).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))
    }
}
