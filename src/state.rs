use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{BookingRepository, LoyaltyRepository, ScheduleRepository};
use crate::domain::services::availability::AvailabilityManager;
use crate::domain::services::loyalty::LoyaltyLedger;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub loyalty_repo: Arc<dyn LoyaltyRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub availability: Arc<AvailabilityManager>,
    pub ledger: Arc<LoyaltyLedger>,
}
