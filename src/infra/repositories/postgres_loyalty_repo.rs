use crate::domain::models::loyalty::{
    LedgerEntry, LoyaltyAccount, Tier, KIND_EARNED, KIND_EXPIRED, KIND_REDEEMED,
};
use crate::domain::ports::LoyaltyRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresLoyaltyRepo {
    pool: PgPool,
}

impl PostgresLoyaltyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn insert_entry_sql() -> &'static str {
    "INSERT INTO loyalty_entries (id, user_id, kind, points, description, booking_id, expires_at, created_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
}

#[async_trait]
impl LoyaltyRepository for PostgresLoyaltyRepo {
    async fn find_account(&self, user_id: &str) -> Result<Option<LoyaltyAccount>, AppError> {
        sqlx::query_as::<_, LoyaltyAccount>("SELECT * FROM loyalty_accounts WHERE user_id = $1").bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError> {
        sqlx::query_as::<_, LedgerEntry>("SELECT * FROM loyalty_entries WHERE user_id = $1 ORDER BY created_at ASC, id ASC").bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn credit(&self, entry: &LedgerEntry) -> Result<LoyaltyAccount, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("INSERT INTO loyalty_accounts (user_id, points, tier, total_earned, total_redeemed, total_expired, created_at, updated_at) VALUES ($1, 0, 'BRONZE', 0, 0, 0, $2, $3) ON CONFLICT (user_id) DO NOTHING")
            .bind(&entry.user_id).bind(now).bind(now)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let mut account = if entry.kind == KIND_EARNED {
            sqlx::query_as::<_, LoyaltyAccount>("UPDATE loyalty_accounts SET points = points + $1, total_earned = total_earned + $1, updated_at = $2 WHERE user_id = $3 RETURNING *")
                .bind(entry.points).bind(now).bind(&entry.user_id)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?
        } else {
            sqlx::query_as::<_, LoyaltyAccount>("UPDATE loyalty_accounts SET points = points + $1, updated_at = $2 WHERE user_id = $3 RETURNING *")
                .bind(entry.points).bind(now).bind(&entry.user_id)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?
        };

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
            KIND_REDEEMED => "UPDATE loyalty_accounts SET points = points - $1, total_redeemed = total_redeemed + $1, updated_at = $2 WHERE user_id = $3 AND points >= $1 RETURNING *",
            KIND_EXPIRED => "UPDATE loyalty_accounts SET points = points - $1, total_expired = total_expired + $1, updated_at = $2 WHERE user_id = $3 AND points >= $1 RETURNING *",
            _ => "UPDATE loyalty_accounts SET points = points - $1, updated_at = $2 WHERE user_id = $3 AND points >= $1 RETURNING *",
        };

        let updated = sqlx::query_as::<_, LoyaltyAccount>(sql)
            .bind(amount).bind(now).bind(&entry.user_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let mut account = match updated {
            Some(account) => account,
            None => {
                let exists = sqlx::query("SELECT 1 FROM loyalty_accounts WHERE user_id = $1")
                    .bind(&entry.user_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
                return match exists {
                    Some(_) => Err(AppError::InsufficientPoints(format!("Balance does not cover {} points", amount))),
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

async fn recompute_tier(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    mut account: LoyaltyAccount,
) -> Result<LoyaltyAccount, AppError> {
    let tier = Tier::for_points(account.points);
    if tier.as_str() != account.tier {
        sqlx::query("UPDATE loyalty_accounts SET tier = $1 WHERE user_id = $2")
            .bind(tier.as_str()).bind(&account.user_id)
            .execute(&mut **tx).await.map_err(AppError::Database)?;
        account.tier = tier.as_str().to_string();
    }
    Ok(account)
}
