pub mod sqlite_booking_repo;
pub mod sqlite_loyalty_repo;
pub mod sqlite_schedule_repo;

pub mod postgres_booking_repo;
pub mod postgres_loyalty_repo;
pub mod postgres_schedule_repo;
