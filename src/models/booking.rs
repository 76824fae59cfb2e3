use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const MIN_PARTICIPANTS: i32 = 1;
pub const MAX_PARTICIPANTS: i32 = 10;

/// A booking row. `is_weekend`, `base_price` and `total_price` are a
/// snapshot taken at creation and never recomputed, so a later price change
/// does not rewrite existing bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub participants: i32,
    pub child_age: Option<String>,
    pub requests: Option<String>,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub is_weekend: bool,
    pub base_price: i64,
    pub total_price: i64,
    pub campaign_type: String,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Release,
    Reserve,
    None,
}

pub fn slot_action(old: BookingStatus, new: BookingStatus) -> SlotAction {
    use BookingStatus::*;
    match (old, new) {
        (a, b) if a == b => SlotAction::None,
        (_, Cancelled) => SlotAction::Release,
        (Cancelled, _) => SlotAction::Reserve,
        _ => SlotAction::None,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub participants: i32,
    #[serde(default)]
    pub child_age: Option<String>,
    #[serde(default)]
    pub requests: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub is_weekend: Option<bool>,
    #[serde(default)]
    pub base_price: Option<i64>,
    #[serde(default)]
    pub total_price: Option<i64>,
    #[serde(default)]
    pub campaign_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingStats {
    pub total: i64,
    pub confirmed: i64,
    pub cancelled: i64,
    pub completed: i64,
    pub revenue: i64,
}
