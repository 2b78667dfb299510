use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use std::sync::Arc;
use crate::state::AppState;

/// Admin endpoints are guarded by a static bearer token. Session and user
/// management live upstream; by the time a request reaches this service the
/// caller is either "an admin" or not.
pub struct AdminAuth;

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let header_val = parts.headers.get(header::AUTHORIZATION)
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let token = header_val.strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if token != app_state.config.admin_api_token {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AdminAuth)
    }
}

/// Resolved customer identity, set by the upstream gateway after it has
/// authenticated the caller.
pub struct Customer(pub String);

impl<S> FromRequestParts<S> for Customer
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer_id = parts.headers.get("X-Customer-Id")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .trim();

        if customer_id.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(Customer(customer_id.to_string()))
    }
}
