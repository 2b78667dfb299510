use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub email: String,
    pub vehicle: String,
    pub service: String,
    pub address: String,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM"
    pub start_time: String,
    pub price: i32,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDayRequest {
    pub is_holiday: Option<bool>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBlockoutRequest {
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct RedeemRequest {
    pub discount_dollars: i64,
    pub description: Option<String>,
    pub booking_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AdjustPointsRequest {
    /// Signed: positive credits, negative debits.
    pub points: i64,
    pub description: String,
}

#[derive(Deserialize)]
pub struct ExpirePointsRequest {
    pub points: i64,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingsQuery {
    pub date: Option<String>,
}
