use serde::Serialize;

use crate::domain::models::loyalty::{LedgerEntry, LoyaltyAccount, TierBenefit, TierProgress};
use crate::domain::models::schedule::{Blockout, DaySchedule, TimeSlot};

#[derive(Serialize)]
pub struct SlotView {
    pub start_time: String,
    pub end_time: String,
    pub max_bookings: i32,
    pub current_bookings: i32,
    pub is_available: bool,
}

impl From<&TimeSlot> for SlotView {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start_time: slot.start_time.clone(),
            end_time: slot.end_time.clone(),
            max_bookings: slot.max_bookings,
            current_bookings: slot.current_bookings,
            is_available: slot.is_available(),
        }
    }
}

#[derive(Serialize)]
pub struct DayScheduleResponse {
    pub date: String,
    pub is_holiday: bool,
    pub open_time: String,
    pub close_time: String,
    pub time_slots: Vec<SlotView>,
    pub blockouts: Vec<Blockout>,
}

impl From<DaySchedule> for DayScheduleResponse {
    fn from(day: DaySchedule) -> Self {
        Self {
            date: day.day.date.to_string(),
            is_holiday: day.day.is_holiday,
            open_time: day.day.open_time,
            close_time: day.day.close_time,
            time_slots: day.time_slots.iter().map(SlotView::from).collect(),
            blockouts: day.blockouts,
        }
    }
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: String,
    pub slots: Vec<String>,
}

#[derive(Serialize)]
pub struct LoyaltyAccountResponse {
    pub user_id: String,
    pub points: i64,
    pub tier: String,
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub total_expired: i64,
    pub next_tier_progress: TierProgress,
    pub benefits: &'static [TierBenefit],
    pub history: Vec<LedgerEntry>,
}

impl LoyaltyAccountResponse {
    pub fn from_account(account: LoyaltyAccount, history: Vec<LedgerEntry>) -> Self {
        Self {
            user_id: account.user_id.clone(),
            points: account.points,
            tier: account.tier.clone(),
            total_earned: account.total_earned,
            total_redeemed: account.total_redeemed,
            total_expired: account.total_expired,
            next_tier_progress: account.next_tier_progress(),
            benefits: account.current_tier().benefits(),
            history,
        }
    }
}

#[derive(Serialize)]
pub struct RedeemResponse {
    pub points_redeemed: i64,
    pub discount_dollars: i64,
    pub account: LoyaltyAccountResponse,
}
