pub mod availability;
pub mod loyalty;
pub mod slots;
