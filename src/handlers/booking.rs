use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{
    is_weekend, price_for, AvailableTimes, Booking, BookingInput, DispatchResult, Unbookable,
    SESSION_MINUTES, SLOT_TIMES, WEEKDAY_PRICE, WEEKEND_PRICE,
};
use crate::services::{availability, booking};
use crate::state::AppState;

// GET /api/campaign
#[derive(Serialize)]
pub struct CampaignResponse {
    name: String,
    start: NaiveDate,
    end: NaiveDate,
    blackout_start: NaiveDate,
    blackout_end: NaiveDate,
    weekday_price: i64,
    weekend_price: i64,
    slot_times: Vec<&'static str>,
    session_minutes: i64,
}

pub async fn campaign_info(State(state): State<Arc<AppState>>) -> Json<CampaignResponse> {
    let c = &state.config.campaign;
    Json(CampaignResponse {
        name: c.name.clone(),
        start: c.start,
        end: c.end,
        blackout_start: c.blackout_start,
        blackout_end: c.blackout_end,
        weekday_price: WEEKDAY_PRICE,
        weekend_price: WEEKEND_PRICE,
        slot_times: SLOT_TIMES.to_vec(),
        session_minutes: SESSION_MINUTES,
    })
}

// GET /api/availability?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    date: NaiveDate,
    bookable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<Unbookable>,
    is_weekend: bool,
    price: i64,
    booked: Vec<String>,
    available: AvailableTimes,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let today = Local::now().date_naive();
    let reason = state.config.campaign.unbookable_reason(query.date, today);

    let booked = {
        let db = state.db()?;
        availability::list_booked_times(&db, query.date)?
    };

    // Closed days offer nothing, whatever the slot table says.
    let available = if reason.is_none() {
        AvailableTimes::from_booked(&booked)
    } else {
        AvailableTimes::default()
    };

    Ok(Json(AvailabilityResponse {
        date: query.date,
        bookable: reason.is_none(),
        reason,
        is_weekend: is_weekend(query.date),
        price: price_for(query.date),
        booked: booked.into_iter().collect(),
        available,
    }))
}

// POST /api/bookings
#[derive(Serialize)]
pub struct CreateBookingResponse {
    booking: Booking,
    notifications: DispatchResult,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(input): Json<BookingInput>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let today = Local::now().date_naive();
    booking::validate(&input, &state.config.campaign, today)?;

    let created = {
        let db = state.db()?;
        // Checked under the same lock as the insert, so requests racing
        // through this process cannot both take the slot.
        if availability::list_booked_times(&db, input.date)?.contains(&input.time) {
            return Err(AppError::Conflict(format!(
                "{} {} is already booked",
                input.date, input.time
            )));
        }
        booking::create(&db, &state.config.campaign, input)?
    };

    let notifications = state.notifier.notify(&state.db, &created).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking: created,
            notifications,
        }),
    ))
}
