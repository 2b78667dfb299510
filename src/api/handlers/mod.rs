pub mod booking;
pub mod health;
pub mod loyalty;
pub mod schedule;
