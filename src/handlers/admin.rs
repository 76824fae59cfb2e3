use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStats, BookingStatus, EmailNotification};
use crate::services::auth::{self, SessionToken};
use crate::services::booking;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    auth::verify(&state.config.session_secret, token, Utc::now())
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionToken>, AppError> {
    let config = &state.config;
    if !auth::check_password(&config.session_secret, &config.admin_password, &body.password) {
        tracing::warn!("admin login rejected");
        return Err(AppError::Unauthorized);
    }

    let session = auth::issue(
        &config.session_secret,
        config.admin_session_ttl_minutes,
        Utc::now(),
    )?;
    tracing::info!(expires_at = %session.expires_at, "admin session issued");
    Ok(Json(session))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<BookingStatus>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state)?;

    let db = state.db()?;
    Ok(Json(booking::list_all(&db, query.status)?))
}

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BookingStats>, AppError> {
    check_auth(&headers, &state)?;

    let db = state.db()?;
    Ok(Json(queries::booking_stats(&db)?))
}

// GET /api/admin/bookings/:id/notifications
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<EmailNotification>>, AppError> {
    check_auth(&headers, &state)?;

    let db = state.db()?;
    Ok(Json(booking::notifications_for(&db, &id)?))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state)?;

    let db = state.db()?;
    Ok(Json(booking::update_status(&db, &id, body.status)?))
}

// DELETE /api/admin/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state)?;

    let db = state.db()?;
    Ok(Json(booking::delete(&db, &id)?))
}

// GET /api/admin/store-check
#[derive(Serialize)]
pub struct StoreCheckResponse {
    connection: bool,
    read_access: bool,
    write_access: bool,
    delete_access: bool,
    booking_count: i64,
    checked_at: String,
}

pub async fn store_check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StoreCheckResponse>, AppError> {
    check_auth(&headers, &state)?;

    let check = {
        let db = state.db()?;
        queries::check_store(&db)?
    };

    Ok(Json(StoreCheckResponse {
        connection: true,
        read_access: true,
        write_access: check.write_access,
        delete_access: check.delete_access,
        booking_count: check.booking_count,
        checked_at: Utc::now().to_rfc3339(),
    }))
}
