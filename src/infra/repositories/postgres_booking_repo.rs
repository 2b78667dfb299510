use crate::domain::models::booking::Booking;
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("INSERT INTO bookings (id, customer_id, customer_name, customer_email, vehicle, service, address, date, start_time, price, status, management_token, notes, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *")
            .bind(&booking.id).bind(&booking.customer_id).bind(&booking.customer_name).bind(&booking.customer_email)
            .bind(&booking.vehicle).bind(&booking.service).bind(&booking.address).bind(booking.date)
            .bind(&booking.start_time).bind(booking.price).bind(&booking.status)
            .bind(&booking.management_token).bind(&booking.notes).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE management_token = $1").bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE customer_id = $1 ORDER BY date ASC, start_time ASC").bind(customer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE date = $1 ORDER BY start_time ASC").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))
    }
}
