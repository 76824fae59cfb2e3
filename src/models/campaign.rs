use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WEEKDAY_PRICE: i64 = 5_500;
pub const WEEKEND_PRICE: i64 = 7_700;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub blackout_start: NaiveDate,
    pub blackout_end: NaiveDate,
}

impl Default for Campaign {
    fn default() -> Self {
        Self {
            name: "Summer Photo Campaign".to_string(),
            start: ymd(2025, 8, 1),
            end: ymd(2025, 9, 7),
            // Obon holidays
            blackout_start: ymd(2025, 8, 11),
            blackout_end: ymd(2025, 8, 16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unbookable {
    Past,
    OutsideCampaign,
    Blackout,
}

impl Campaign {
    pub fn is_within_campaign(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackout_start <= date && date <= self.blackout_end
    }

    pub fn is_bookable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.unbookable_reason(date, today).is_none()
    }

    pub fn unbookable_reason(&self, date: NaiveDate, today: NaiveDate) -> Option<Unbookable> {
        if date < today {
            Some(Unbookable::Past)
        } else if !self.is_within_campaign(date) {
            Some(Unbookable::OutsideCampaign)
        } else if self.is_blackout(date) {
            Some(Unbookable::Blackout)
        } else {
            None
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn price_for(date: NaiveDate) -> i64 {
    if is_weekend(date) {
        WEEKEND_PRICE
    } else {
        WEEKDAY_PRICE
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_weekend: bool,
    pub price: i64,
    pub bookable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Unbookable>,
}

pub fn month_calendar(
    campaign: &Campaign,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| {
            let reason = campaign.unbookable_reason(date, today);
            CalendarDay {
                date,
                weekday: date.format("%a").to_string(),
                is_weekend: is_weekend(date),
                price: price_for(date),
                bookable: reason.is_none(),
                reason,
            }
        })
        .collect();

    Some(days)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
