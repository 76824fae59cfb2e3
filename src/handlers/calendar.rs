use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{month_calendar, CalendarDay};
use crate::services::booking;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /api/calendar?month=YYYY-MM
#[derive(Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    year: i32,
    month: u32,
    days: Vec<CalendarDay>,
}

pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = Local::now().date_naive();

    // Default to the month the campaign opens, or the current one once it has.
    let first = match query.month.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("invalid month: {raw}, expected YYYY-MM")))?,
        None => today.max(state.config.campaign.start),
    };

    let days = month_calendar(&state.config.campaign, first.year(), first.month(), today)
        .ok_or_else(|| AppError::Validation("invalid month".to_string()))?;

    Ok(Json(CalendarResponse {
        year: first.year(),
        month: first.month(),
        days,
    }))
}

// GET /api/bookings/:id/calendar.ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Response, AppError> {
    let found = {
        let db = state.db()?;
        booking::get(&db, &booking_id)?
    };

    let ics = generate_ics(&found, &state.config.studio).map_err(|e| {
        tracing::error!(booking_id = %booking_id, error = %e, "failed to build calendar file");
        AppError::Calendar(format!("booking {booking_id} has no valid session time"))
    })?;
    let filename = format!("booking-{booking_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
