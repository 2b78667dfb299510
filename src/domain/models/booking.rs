use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_CANCELLED: &str = "CANCELLED";
pub const STATUS_COMPLETED: &str = "COMPLETED";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub vehicle: String,
    pub service: String,
    pub address: String,
    pub date: NaiveDate,
    pub start_time: String,
    /// Whole dollars. Loyalty accrual is 1 point per dollar on completion.
    pub price: i32,
    pub status: String,
    pub management_token: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub vehicle: String,
    pub service: String,
    pub address: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub price: i32,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: params.customer_id,
            customer_name: params.name,
            customer_email: params.email,
            vehicle: params.vehicle,
            service: params.service,
            address: params.address,
            date: params.date,
            start_time: params.start_time,
            price: params.price,
            status: STATUS_CONFIRMED.to_string(),
            management_token: token,
            notes: params.notes,
            created_at: Utc::now(),
        }
    }
}
