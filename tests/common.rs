use detailing_backend::{
    api::router::create_router,
    config::Config,
    domain::services::availability::AvailabilityManager,
    domain::services::loyalty::LoyaltyLedger,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_loyalty_repo::SqliteLoyaltyRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
    },
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use serde_json::Value;
use uuid::Uuid;

pub const ADMIN_TOKEN: &str = "test-admin-token";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_capacity(1).await
    }

    pub async fn with_capacity(slot_capacity: i32) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        // One connection: concurrent writers queue on the pool instead of
        // tripping SQLITE_BUSY mid-test.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            admin_api_token: ADMIN_TOKEN.to_string(),
            business_timezone: "UTC".to_string(),
            open_time: "09:00".to_string(),
            close_time: "17:00".to_string(),
            slot_duration_min: 120,
            slot_capacity,
        };

        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let loyalty_repo = Arc::new(SqliteLoyaltyRepo::new(pool.clone()));

        let state = Arc::new(AppState {
            config: config.clone(),
            schedule_repo: schedule_repo.clone(),
            loyalty_repo: loyalty_repo.clone(),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            availability: Arc::new(AvailabilityManager::new(schedule_repo, config.clone())),
            ledger: Arc::new(LoyaltyLedger::new(loyalty_repo)),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn customer_get(uri: &str, customer_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-Customer-Id", customer_id)
        .body(Body::empty())
        .unwrap()
}

pub fn customer_post(uri: &str, customer_id: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Customer-Id", customer_id)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

pub fn admin_request(method: &str, uri: &str, payload: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN));

    match payload {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}
