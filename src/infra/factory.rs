use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::availability::AvailabilityManager;
use crate::domain::services::loyalty::LoyaltyLedger;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_loyalty_repo::PostgresLoyaltyRepo,
    postgres_schedule_repo::PostgresScheduleRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_loyalty_repo::SqliteLoyaltyRepo,
    sqlite_schedule_repo::SqliteScheduleRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let schedule_repo = Arc::new(PostgresScheduleRepo::new(pool.clone()));
        let loyalty_repo = Arc::new(PostgresLoyaltyRepo::new(pool.clone()));

        AppState {
            config: config.clone(),
            schedule_repo: schedule_repo.clone(),
            loyalty_repo: loyalty_repo.clone(),
            booking_repo: Arc::new(PostgresBookingRepo::new(pool.clone())),
            availability: Arc::new(AvailabilityManager::new(schedule_repo, config.clone())),
            ledger: Arc::new(LoyaltyLedger::new(loyalty_repo)),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let loyalty_repo = Arc::new(SqliteLoyaltyRepo::new(pool.clone()));

        AppState {
            config: config.clone(),
            schedule_repo: schedule_repo.clone(),
            loyalty_repo: loyalty_repo.clone(),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            availability: Arc::new(AvailabilityManager::new(schedule_repo, config.clone())),
            ledger: Arc::new(LoyaltyLedger::new(loyalty_repo)),
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
