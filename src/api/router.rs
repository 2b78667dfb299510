use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{booking, health, loyalty, schedule};
use tower_http::{
    classify::ServerErrorsFailureClass,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Schedule (public reads, admin writes)
        .route("/api/v1/schedule/{date}", get(schedule::get_day).put(schedule::update_day))
        .route("/api/v1/schedule/{date}/slots", get(schedule::get_slots))
        .route("/api/v1/schedule/{date}/blockouts", post(schedule::add_blockout))
        .route("/api/v1/schedule/{date}/blockouts/{blockout_id}", delete(schedule::remove_blockout))

        // Customer booking flow
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_my_bookings))
        .route("/api/v1/bookings/manage/{token}", get(booking::get_booking_by_token))
        .route("/api/v1/bookings/manage/{token}/cancel", post(booking::cancel_booking_by_token))

        // Admin booking management
        .route("/api/v1/admin/bookings", get(booking::list_bookings))
        .route("/api/v1/admin/bookings/{booking_id}", get(booking::get_booking).delete(booking::cancel_booking))
        .route("/api/v1/admin/bookings/{booking_id}/complete", post(booking::complete_booking))

        // Loyalty
        .route("/api/v1/loyalty/me", get(loyalty::get_my_account))
        .route("/api/v1/loyalty/redeem", post(loyalty::redeem))
        .route("/api/v1/admin/loyalty/{user_id}", get(loyalty::get_account))
        .route("/api/v1/admin/loyalty/{user_id}/adjust", post(loyalty::adjust_points))
        .route("/api/v1/admin/loyalty/{user_id}/expire", post(loyalty::expire_points))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        customer_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
