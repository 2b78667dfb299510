use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{AdjustPointsRequest, ExpirePointsRequest, RedeemRequest};
use crate::api::dtos::responses::{LoyaltyAccountResponse, RedeemResponse};
use crate::api::extractors::auth::{AdminAuth, Customer};
use crate::domain::models::loyalty::LoyaltyAccount;
use crate::domain::services::loyalty::points_for_discount;
use crate::error::AppError;
use crate::state::AppState;

async fn account_response(state: &AppState, user_id: &str) -> Result<LoyaltyAccountResponse, AppError> {
    // Accounts materialize on first earn; a customer without one sees a
    // zeroed Bronze view rather than an error.
    let account = state.ledger.account(user_id).await?
        .unwrap_or_else(|| LoyaltyAccount::new(user_id.to_string()));
    let history = state.ledger.history(user_id).await?;
    Ok(LoyaltyAccountResponse::from_account(account, history))
}

pub async fn get_my_account(
    State(state): State<Arc<AppState>>,
    Customer(customer_id): Customer,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(account_response(&state, &customer_id).await?))
}

pub async fn redeem(
    State(state): State<Arc<AppState>>,
    Customer(customer_id): Customer,
    Json(payload): Json<RedeemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.ledger.account(&customer_id).await?
        .ok_or_else(|| AppError::InsufficientPoints("No points available".into()))?;

    // Tier sets the exchange rate; the ledger only ever sees the point amount.
    let points = points_for_discount(account.current_tier(), payload.discount_dollars)?;
    let description = payload.description
        .unwrap_or_else(|| format!("${} discount", payload.discount_dollars));

    state.ledger.redeem_points(&customer_id, points, &description, payload.booking_id).await?;
    info!("Customer {} redeemed {} points for ${} off", customer_id, points, payload.discount_dollars);

    Ok(Json(RedeemResponse {
        points_redeemed: points,
        discount_dollars: payload.discount_dollars,
        account: account_response(&state, &customer_id).await?,
    }))
}

pub async fn get_account(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.ledger.account(&user_id).await?
        .ok_or_else(|| AppError::NotFound("Loyalty account not found".into()))?;
    Ok(Json(account_response(&state, &user_id).await?))
}

pub async fn adjust_points(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(user_id): Path<String>,
    Json(payload): Json<AdjustPointsRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.ledger.adjust_points(&user_id, payload.points, &payload.description).await?;
    info!("Adjusted {} points for {}: {}", payload.points, user_id, payload.description);
    Ok(Json(account_response(&state, &user_id).await?))
}

pub async fn expire_points(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(user_id): Path<String>,
    Json(payload): Json<ExpirePointsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let description = payload.description.unwrap_or_else(|| "Points expired".to_string());
    state.ledger.expire_points(&user_id, payload.points, &description).await?;
    Ok(Json(account_response(&state, &user_id).await?))
}
