pub mod booking;
pub mod loyalty;
pub mod schedule;
