use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub admin_api_token: String,
    pub business_timezone: String,
    pub open_time: String,
    pub close_time: String,
    pub slot_duration_min: u32,
    pub slot_capacity: i32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            admin_api_token: env::var("ADMIN_API_TOKEN").expect("ADMIN_API_TOKEN must be set"),
            business_timezone: env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "America/New_York".to_string()),
            open_time: env::var("OPEN_TIME").unwrap_or_else(|_| "09:00".to_string()),
            close_time: env::var("CLOSE_TIME").unwrap_or_else(|_| "17:00".to_string()),
            slot_duration_min: env::var("SLOT_DURATION_MIN").unwrap_or_else(|_| "120".to_string()).parse().expect("SLOT_DURATION_MIN must be a number"),
            slot_capacity: env::var("SLOT_CAPACITY").unwrap_or_else(|_| "1".to_string()).parse().expect("SLOT_CAPACITY must be a number"),
        }
    }
}
