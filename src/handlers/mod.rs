pub mod admin;
pub mod booking;
pub mod calendar;
pub mod health;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/campaign", get(booking::campaign_info))
        .route("/api/calendar", get(calendar::get_calendar))
        .route("/api/availability", get(booking::get_availability))
        .route("/api/bookings", post(booking::create_booking))
        .route(
            "/api/bookings/:id/calendar.ics",
            get(calendar::download_ics),
        )
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/bookings", get(admin::get_bookings))
        .route("/api/admin/stats", get(admin::get_stats))
        .route(
            "/api/admin/bookings/:id/notifications",
            get(admin::get_notifications),
        )
        .route(
            "/api/admin/bookings/:id/status",
            post(admin::update_status),
        )
        .route("/api/admin/bookings/:id", delete(admin::delete_booking))
        .route("/api/admin/store-check", get(admin::store_check))
        .with_state(state)
}
