use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const SLOT_TIMES: [&str; 12] = [
    "10:00", "10:30", "11:00", "11:30", //
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30",
];

pub const SESSION_MINUTES: i64 = 20;

const MIDDAY: &str = "12:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Afternoon,
}

pub fn is_valid_slot(time: &str) -> bool {
    SLOT_TIMES.contains(&time)
}

pub fn period_of(time: &str) -> Period {
    // Zero-padded HH:MM compares correctly as a string.
    if time < MIDDAY {
        Period::Morning
    } else {
        Period::Afternoon
    }
}

pub fn parse_slot_time(time: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| anyhow::anyhow!("invalid time format: {time}"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecord {
    pub date: NaiveDate,
    pub time: String,
    pub is_available: bool,
    pub booking_id: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AvailableTimes {
    pub morning: Vec<String>,
    pub afternoon: Vec<String>,
}

impl AvailableTimes {
    pub fn from_booked(booked: &BTreeSet<String>) -> Self {
        let mut open = Self::default();
        for time in SLOT_TIMES.iter().filter(|t| !booked.contains(**t)) {
            match period_of(time) {
                Period::Morning => open.morning.push(time.to_string()),
                Period::Afternoon => open.afternoon.push(time.to_string()),
            }
        }
        open
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
