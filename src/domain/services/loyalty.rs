use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::models::loyalty::{
    LedgerEntry, LoyaltyAccount, Tier, KIND_ADJUSTED, KIND_EARNED, KIND_EXPIRED, KIND_REDEEMED,
};
use crate::domain::ports::LoyaltyRepository;
use crate::error::AppError;

/// The only mutation path into a user's point balance. Every operation
/// appends one ledger entry and applies the matching balance change in a
/// single transaction, so `points` always equals the sum of the history.
pub struct LoyaltyLedger {
    repo: Arc<dyn LoyaltyRepository>,
}

impl LoyaltyLedger {
    pub fn new(repo: Arc<dyn LoyaltyRepository>) -> Self {
        Self { repo }
    }

    pub async fn account(&self, user_id: &str) -> Result<Option<LoyaltyAccount>, AppError> {
        self.repo.find_account(user_id).await
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError> {
        self.repo.list_entries(user_id).await
    }

    pub async fn add_points(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        booking_id: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<LoyaltyAccount, AppError> {
        if amount <= 0 {
            return Err(AppError::Validation("Earned amount must be positive".into()));
        }

        let entry = LedgerEntry::new(
            user_id.to_string(),
            KIND_EARNED,
            amount,
            description.to_string(),
            booking_id,
            expires_at,
        );
        let account = self.repo.credit(&entry).await?;
        info!("Credited {} points to {} (balance {}, tier {})", amount, user_id, account.points, account.tier);
        Ok(account)
    }

    pub async fn redeem_points(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        booking_id: Option<String>,
    ) -> Result<LoyaltyAccount, AppError> {
        if amount <= 0 {
            return Err(AppError::Validation("Redeemed amount must be positive".into()));
        }

        let entry = LedgerEntry::new(
            user_id.to_string(),
            KIND_REDEEMED,
            -amount,
            description.to_string(),
            booking_id,
            None,
        );
        let account = self.repo.debit(&entry).await?;
        info!("Redeemed {} points from {} (balance {}, tier {})", amount, user_id, account.points, account.tier);
        Ok(account)
    }

    /// Admin-triggered expiry. There is no background scheduler in this core,
    /// so expired entries are written by an explicit operation.
    pub async fn expire_points(&self, user_id: &str, amount: i64, description: &str) -> Result<LoyaltyAccount, AppError> {
        if amount <= 0 {
            return Err(AppError::Validation("Expired amount must be positive".into()));
        }

        let entry = LedgerEntry::new(
            user_id.to_string(),
            KIND_EXPIRED,
            -amount,
            description.to_string(),
            None,
            None,
        );
        self.repo.debit(&entry).await
    }

    /// Admin correction, either direction. Negative adjustments share the
    /// non-negative-balance guard with redemption.
    pub async fn adjust_points(&self, user_id: &str, amount: i64, description: &str) -> Result<LoyaltyAccount, AppError> {
        if amount == 0 {
            return Err(AppError::Validation("Adjustment must be non-zero".into()));
        }

        let entry = LedgerEntry::new(
            user_id.to_string(),
            KIND_ADJUSTED,
            amount,
            description.to_string(),
            None,
            None,
        );
        if amount > 0 {
            self.repo.credit(&entry).await
        } else {
            self.repo.debit(&entry).await
        }
    }
}

/// Convert a requested discount into the point amount to debit, using the
/// caller's current tier. The ledger itself never sees dollar values.
pub fn points_for_discount(tier: Tier, discount_dollars: i64) -> Result<i64, AppError> {
    if discount_dollars <= 0 {
        return Err(AppError::Validation("Discount must be positive".into()));
    }
    if discount_dollars % 10 != 0 {
        return Err(AppError::Validation("Discount must be in $10 increments".into()));
    }
    (discount_dollars / 10)
        .checked_mul(tier.points_per_ten_dollars())
        .ok_or_else(|| AppError::Validation("Discount is too large".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_conversion_per_tier() {
        assert_eq!(points_for_discount(Tier::Bronze, 10).unwrap(), 100);
        assert_eq!(points_for_discount(Tier::Silver, 10).unwrap(), 80);
        assert_eq!(points_for_discount(Tier::Gold, 30).unwrap(), 180);
        assert_eq!(points_for_discount(Tier::Platinum, 20).unwrap(), 100);
    }

    #[test]
    fn test_discount_conversion_rejects_bad_input() {
        assert!(points_for_discount(Tier::Bronze, 0).is_err());
        assert!(points_for_discount(Tier::Bronze, -10).is_err());
        assert!(points_for_discount(Tier::Bronze, 15).is_err());
    }

    #[test]
    fn test_discount_conversion_rejects_overflowing_amount() {
        // A multiple of 10 whose conversion cannot fit in i64.
        let huge = i64::MAX - 7;
        assert!(points_for_discount(Tier::Bronze, huge).is_err());
    }
}
