use axum::{extract::{Path, State}, response::IntoResponse, Json};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateBlockoutRequest, UpdateDayRequest};
use crate::api::dtos::responses::{DayScheduleResponse, SlotsResponse};
use crate::api::extractors::auth::AdminAuth;
use crate::error::AppError;
use crate::state::AppState;

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (expected YYYY-MM-DD)".into()))
}

fn validate_time(raw: &str) -> Result<(), AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Invalid time format (expected HH:MM): {}", raw)))
}

pub async fn get_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;
    let day = state.availability.day_schedule(date).await?;
    Ok(Json(DayScheduleResponse::from(day)))
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;
    let day = state.availability.day_schedule(date).await?;

    let slots = day.time_slots.iter()
        .filter(|s| day.is_start_available(&s.start_time))
        .map(|s| s.start_time.clone())
        .collect();

    Ok(Json(SlotsResponse { date: date.to_string(), slots }))
}

pub async fn update_day(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(date): Path<String>,
    Json(payload): Json<UpdateDayRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;

    if payload.open_time.is_some() != payload.close_time.is_some() {
        return Err(AppError::Validation("open_time and close_time must be set together".into()));
    }

    let mut day = state.availability.day_schedule(date).await?;

    if let (Some(open), Some(close)) = (&payload.open_time, &payload.close_time) {
        validate_time(open)?;
        validate_time(close)?;
        if open >= close {
            return Err(AppError::Validation("open_time must be before close_time".into()));
        }
        day = state.availability.set_special_hours(date, open, close).await?;
        info!("Special hours for {}: {} - {}", date, open, close);
    }

    if let Some(is_holiday) = payload.is_holiday {
        day = state.availability.set_holiday(date, is_holiday).await?;
        info!("Holiday flag for {} set to {}", date, is_holiday);
    }

    Ok(Json(DayScheduleResponse::from(day)))
}

pub async fn add_blockout(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(date): Path<String>,
    Json(payload): Json<CreateBlockoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;
    validate_time(&payload.start_time)?;
    validate_time(&payload.end_time)?;
    if payload.start_time >= payload.end_time {
        return Err(AppError::Validation("Blockout start must be before its end".into()));
    }

    let day = state.availability
        .add_blockout(date, payload.start_time, payload.end_time, payload.reason)
        .await?;
    Ok(Json(DayScheduleResponse::from(day)))
}

pub async fn remove_blockout(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path((date, blockout_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;
    let day = state.availability.remove_blockout(date, &blockout_id).await?;
    Ok(Json(DayScheduleResponse::from(day)))
}
