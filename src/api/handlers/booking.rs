use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use chrono::{Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::{BookingsQuery, CreateBookingRequest};
use crate::api::extractors::auth::{AdminAuth, Customer};
use crate::api::handlers::schedule::parse_date;
use crate::domain::models::booking::{Booking, NewBookingParams, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_CONFIRMED};
use crate::error::AppError;
use crate::state::AppState;

/// Points earned per dollar of service price on completion.
const POINTS_PER_DOLLAR: i64 = 1;
/// Earned points carry a one-year expiry stamp for the admin expiry flow.
const POINTS_VALIDITY_DAYS: i64 = 365;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Customer(customer_id): Customer,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&payload.date)?;
    NaiveTime::parse_from_str(&payload.start_time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (expected HH:MM)".into()))?;

    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::Validation("Name and email are required".into()));
    }
    if payload.address.trim().is_empty() {
        return Err(AppError::Validation("Service address is required".into()));
    }
    if payload.price <= 0 {
        return Err(AppError::Validation("Price must be positive".into()));
    }

    let tz: Tz = state.config.business_timezone.parse().unwrap_or(chrono_tz::UTC);
    let today = Utc::now().with_timezone(&tz).date_naive();
    if date < today {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let booking = Booking::new(NewBookingParams {
        customer_id,
        name: payload.name,
        email: payload.email,
        vehicle: payload.vehicle,
        service: payload.service,
        address: payload.address,
        date,
        start_time: payload.start_time.clone(),
        price: payload.price,
        notes: payload.notes,
    });

    // Slot first, record second: no booking record may exist without its
    // reservation. A failed insert hands the unit back.
    state.availability.reserve_slot(date, &payload.start_time, &booking.id).await?;

    let created = match state.booking_repo.create(&booking).await {
        Ok(created) => created,
        Err(e) => {
            // A concurrent reservation may have overwritten the slot's scalar
            // reference already, so the compensating release cannot go by-ref.
            warn!("Booking insert failed after reservation, releasing slot {} {}", date, payload.start_time);
            if let Err(release_err) = state.availability.force_release_slot(date, &payload.start_time).await {
                warn!("Compensating release failed: {}", release_err);
            }
            return Err(e);
        }
    };

    info!("Booking {} created for {} {}", created.id, date, created.start_time);
    Ok(Json(created))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    Customer(customer_id): Customer,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_customer(&customer_id).await?;
    Ok(Json(bookings))
}

pub async fn get_booking_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_token(&token).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(booking))
}

pub async fn cancel_booking_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_token(&token).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.status == STATUS_CANCELLED {
        return Ok(Json(booking));
    }
    if booking.status == STATUS_COMPLETED {
        return Err(AppError::Validation("Completed bookings cannot be cancelled".into()));
    }

    state.availability.cancel_slot(booking.date, &booking.start_time, &booking.id).await?;
    let cancelled = state.booking_repo.set_status(&booking.id, STATUS_CANCELLED).await?;
    info!("Booking cancelled via management token: {}", booking.id);

    Ok(Json(cancelled))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<BookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = query.date
        .ok_or_else(|| AppError::Validation("date query parameter is required".into()))?;
    let bookings = state.booking_repo.list_by_date(parse_date(&date)?).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.status == STATUS_CANCELLED {
        return Ok(Json(booking));
    }
    if booking.status == STATUS_COMPLETED {
        return Err(AppError::Validation("Completed bookings cannot be cancelled".into()));
    }

    // A multi-capacity slot keeps only the most recent booking's reference,
    // so an older reservation may no longer match by ref. The admin path
    // falls back to a forced release rather than stranding the unit.
    match state.availability.cancel_slot(booking.date, &booking.start_time, &booking.id).await {
        Ok(()) => {}
        Err(AppError::BookingMismatch(msg)) => {
            warn!("Reference mismatch on admin cancel ({}), forcing release", msg);
            state.availability.force_release_slot(booking.date, &booking.start_time).await?;
        }
        Err(e) => return Err(e),
    }

    let cancelled = state.booking_repo.set_status(&booking.id, STATUS_CANCELLED).await?;
    info!("Booking cancelled by admin: {}", booking.id);
    Ok(Json(cancelled))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.status != STATUS_CONFIRMED {
        return Err(AppError::Validation(format!(
            "Only confirmed bookings can be completed (status: {})", booking.status
        )));
    }

    let completed = state.booking_repo.set_status(&booking.id, STATUS_COMPLETED).await?;

    let points = booking.price as i64 * POINTS_PER_DOLLAR;
    let account = state.ledger.add_points(
        &booking.customer_id,
        points,
        &format!("Service completed: {}", booking.service),
        Some(booking.id.clone()),
        Some(Utc::now() + Duration::days(POINTS_VALIDITY_DAYS)),
    ).await?;

    info!("Booking {} completed, {} points credited to {}", booking.id, points, booking.customer_id);

    Ok(Json(serde_json::json!({
        "booking": completed,
        "points_earned": points,
        "balance": account.points,
        "tier": account.tier,
    })))
}
