use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const SILVER_THRESHOLD: i64 = 200;
pub const GOLD_THRESHOLD: i64 = 500;
pub const PLATINUM_THRESHOLD: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// Pure mapping from balance to tier. Monotonic in points.
    pub fn for_points(points: i64) -> Self {
        if points >= PLATINUM_THRESHOLD {
            Tier::Platinum
        } else if points >= GOLD_THRESHOLD {
            Tier::Gold
        } else if points >= SILVER_THRESHOLD {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
        }
    }

    /// Threshold of the next tier up, None at the top.
    pub fn next_threshold(&self) -> Option<i64> {
        match self {
            Tier::Bronze => Some(SILVER_THRESHOLD),
            Tier::Silver => Some(GOLD_THRESHOLD),
            Tier::Gold => Some(PLATINUM_THRESHOLD),
            Tier::Platinum => None,
        }
    }

    /// Fixed benefit list per tier. Behavior differs only in data, so the
    /// tiers are a lookup table rather than a type hierarchy.
    pub fn benefits(&self) -> &'static [TierBenefit] {
        match self {
            Tier::Bronze => &[
                TierBenefit { name: "Points on every service", description: "Earn 1 point per dollar spent" },
                TierBenefit { name: "Birthday bonus", description: "50 bonus points during your birthday month" },
            ],
            Tier::Silver => &[
                TierBenefit { name: "Points on every service", description: "Earn 1 point per dollar spent" },
                TierBenefit { name: "Birthday bonus", description: "75 bonus points during your birthday month" },
                TierBenefit { name: "Better redemption rate", description: "80 points per $10 off instead of 100" },
            ],
            Tier::Gold => &[
                TierBenefit { name: "Points on every service", description: "Earn 1 point per dollar spent" },
                TierBenefit { name: "Birthday bonus", description: "100 bonus points during your birthday month" },
                TierBenefit { name: "Better redemption rate", description: "60 points per $10 off" },
                TierBenefit { name: "Priority scheduling", description: "First pick of weekend slots" },
            ],
            Tier::Platinum => &[
                TierBenefit { name: "Points on every service", description: "Earn 1 point per dollar spent" },
                TierBenefit { name: "Birthday bonus", description: "150 bonus points during your birthday month" },
                TierBenefit { name: "Best redemption rate", description: "50 points per $10 off" },
                TierBenefit { name: "Priority scheduling", description: "First pick of weekend slots" },
                TierBenefit { name: "Free interior refresh", description: "One complimentary interior refresh per year" },
            ],
        }
    }

    /// Redemption exchange rate: points per $10 of discount. The ledger
    /// itself is dollar-agnostic; the conversion happens in the calling flow.
    pub fn points_per_ten_dollars(&self) -> i64 {
        match self {
            Tier::Bronze => 100,
            Tier::Silver => 80,
            Tier::Gold => 60,
            Tier::Platinum => 50,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy)]
pub struct TierBenefit {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct TierProgress {
    pub points_needed: i64,
    pub percentage: f64,
}

/// Progress toward the next tier, derived from the balance alone.
pub fn tier_progress(points: i64) -> TierProgress {
    match Tier::for_points(points).next_threshold() {
        Some(next) => TierProgress {
            points_needed: next - points,
            percentage: (points as f64 / next as f64 * 100.0).min(100.0),
        },
        None => TierProgress { points_needed: 0, percentage: 100.0 },
    }
}

pub const KIND_EARNED: &str = "EARNED";
pub const KIND_REDEEMED: &str = "REDEEMED";
pub const KIND_EXPIRED: &str = "EXPIRED";
pub const KIND_ADJUSTED: &str = "ADJUSTED";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct LoyaltyAccount {
    pub user_id: String,
    pub points: i64,
    /// Stored uppercase name of the derived tier, rewritten alongside every
    /// balance change. `current_tier()` is the typed view.
    pub tier: String,
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub total_expired: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            points: 0,
            tier: Tier::Bronze.as_str().to_string(),
            total_earned: 0,
            total_redeemed: 0,
            total_expired: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn current_tier(&self) -> Tier {
        Tier::for_points(self.points)
    }

    pub fn next_tier_progress(&self) -> TierProgress {
        tier_progress(self.points)
    }
}

/// One immutable record of a point balance change. `points` is signed:
/// positive for credits, negative for debits.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct LedgerEntry {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub points: i64,
    pub description: String,
    pub booking_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        user_id: String,
        kind: &str,
        points: i64,
        description: String,
        booking_id: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            kind: kind.to_string(),
            points,
            description,
            booking_id,
            expires_at,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(Tier::for_points(0), Tier::Bronze);
        assert_eq!(Tier::for_points(199), Tier::Bronze);
        assert_eq!(Tier::for_points(200), Tier::Silver);
        assert_eq!(Tier::for_points(499), Tier::Silver);
        assert_eq!(Tier::for_points(500), Tier::Gold);
        assert_eq!(Tier::for_points(999), Tier::Gold);
        assert_eq!(Tier::for_points(1000), Tier::Platinum);
        assert_eq!(Tier::for_points(50_000), Tier::Platinum);
    }

    #[test]
    fn test_tier_monotonic() {
        let mut last = Tier::Bronze;
        for points in 0..1500 {
            let tier = Tier::for_points(points);
            assert!(tier >= last, "tier regressed at {} points", points);
            last = tier;
        }
    }

    #[test]
    fn test_progress_toward_next_tier() {
        let p = tier_progress(210);
        assert_eq!(p.points_needed, 290);
        assert!((p.percentage - 42.0).abs() < f64::EPSILON);

        let top = tier_progress(2000);
        assert_eq!(top.points_needed, 0);
        assert!((top.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_redemption_rates_improve_with_tier() {
        assert!(Tier::Silver.points_per_ten_dollars() < Tier::Bronze.points_per_ten_dollars());
        assert!(Tier::Gold.points_per_ten_dollars() < Tier::Silver.points_per_ten_dollars());
        assert!(Tier::Platinum.points_per_ten_dollars() < Tier::Gold.points_per_ten_dollars());
    }
}
