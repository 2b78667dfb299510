use crate::domain::models::loyalty::{
    LedgerEntry, LoyaltyAccount, Tier, KIND_EARNED, KIND_EXPIRED, KIND_REDEEMED,
};
use crate::domain::ports::LoyaltyRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteLoyaltyRepo {
    pool: SqlitePool,
}

impl SqliteLoyaltyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn insert_entry_sql() -> &'static str {
    "INSERT INTO loyalty_entries (id, user_id, kind, points, description, booking_id, expires_at, created_at)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
}

#[async_trait]
impl LoyaltyRepository for SqliteLoyaltyRepo {
    async fn find_account(&self, user_id: &str) -> Result<Option<LoyaltyAccount>, AppError> {
        sqlx::query_as::<_, LoyaltyAccount>("SELECT * FROM loyalty_accounts WHERE user_id = ?")
            .bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError> {
        sqlx::query_as::<_, LedgerEntry>("SELECT * FROM loyalty_entries WHERE user_id = ? ORDER BY created_at ASC, id ASC")
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn credit(&self, entry: &LedgerEntry) -> Result<LoyaltyAccount, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // First credit for a user materializes the account.
        sqlx::query(
            "INSERT INTO loyalty_accounts (user_id, points, tier, total_earned, total_redeemed, total_expired, created_at, updated_at)
             VALUES (?, 0, 'BRONZE', 0, 0, 0, ?, ?)
             ON CONFLICT(user_id) DO NOTHING"
        )
            .bind(&entry.user_id).bind(now).bind(now)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let sql = if entry.kind == KIND_EARNED {
            "UPDATE loyalty_accounts SET points = points + ?, total_earned = total_earned + ?, updated_at = ? WHERE user_id = ? RETURNING *"
        } else {
            // Adjustments move the balance without touching the aggregates.
            "UPDATE loyalty_accounts SET points = points + ?, updated_at = ? WHERE user_id = ? RETURNING *"
        };

        let mut query = sqlx::query_as::<_, LoyaltyAccount>(sql).bind(entry.points);
        if entry.kind == KIND_EARNED {
            query = query.bind(entry.points);
        }
        let mut account = query.bind(now).bind(&entry.user_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        account = recompute_tier(&mut tx, account).await?;

        sqlx::query(insert_entry_sql())
            .bind(&entry.id).bind(&entry.user_id).bind(&entry.kind).bind(entry.points)
            .bind(&entry.description).bind(&entry.booking_id).bind(entry.expires_at).bind(entry.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(account)
    }

    async fn debit(&self, entry: &LedgerEntry) -> Result<LoyaltyAccount, AppError> {
        let amount = -entry.points;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let sql = match entry.kind.as_str() {
            KIND_REDEEMED => "UPDATE loyalty_accounts SET points = points - ?, total_redeemed = total_redeemed + ?, updated_at = ? WHERE user_id = ? AND points >= ? RETURNING *",
            KIND_EXPIRED => "UPDATE loyalty_accounts SET points = points - ?, total_expired = total_expired + ?, updated_at = ? WHERE user_id = ? AND points >= ? RETURNING *",
            _ => "UPDATE loyalty_accounts SET points = points - ?, updated_at = ? WHERE user_id = ? AND points >= ? RETURNING *",
        };

        let tracks_total = matches!(entry.kind.as_str(), KIND_REDEEMED | KIND_EXPIRED);
        let mut query = sqlx::query_as::<_, LoyaltyAccount>(sql).bind(amount);
        if tracks_total {
            query = query.bind(amount);
        }
        // The balance guard is part of the UPDATE itself: two simultaneous
        // debits cannot both pass it on one balance.
        let updated = query.bind(now).bind(&entry.user_id).bind(amount)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let mut account = match updated {
            Some(account) => account,
            None => {
                let exists = sqlx::query("SELECT 1 FROM loyalty_accounts WHERE user_id = ?")
                    .bind(&entry.user_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
                return match exists {
                    Some(_) => Err(AppError::InsufficientPoints(format!(
                        "Balance does not cover {} points", amount
                    ))),
                    None => Err(AppError::NotFound("Loyalty account not found".into())),
                };
            }
        };

        account = recompute_tier(&mut tx, account).await?;

        sqlx::query(insert_entry_sql())
            .bind(&entry.id).bind(&entry.user_id).bind(&entry.kind).bind(entry.points)
            .bind(&entry.description).bind(&entry.booking_id).bind(entry.expires_at).bind(entry.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(account)
    }
}

/// Tier is derived from the balance; it is rewritten in the same transaction
/// as every balance change so the stored value can never drift.
async fn recompute_tier(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    mut account: LoyaltyAccount,
) -> Result<LoyaltyAccount, AppError> {
    let tier = Tier::for_points(account.points);
    if tier.as_str() != account.tier {
        sqlx::query("UPDATE loyalty_accounts SET tier = ? WHERE user_id = ?")
            .bind(tier.as_str()).bind(&account.user_id)
            .execute(&mut **tx).await.map_err(AppError::Database)?;
        account.tier = tier.as_str().to_string();
    }
    Ok(account)
}
