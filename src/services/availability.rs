use std::collections::BTreeSet;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{AvailableTimes, BookingStatus};

pub fn list_booked_times(conn: &Connection, date: NaiveDate) -> anyhow::Result<BTreeSet<String>> {
    queries::list_booked_times(conn, date)
}

pub fn available_times(conn: &Connection, date: NaiveDate) -> anyhow::Result<AvailableTimes> {
    let booked = list_booked_times(conn, date)?;
    Ok(AvailableTimes::from_booked(&booked))
}

pub fn mark_unavailable(
    conn: &Connection,
    date: NaiveDate,
    time: &str,
    booking_id: &str,
) -> anyhow::Result<()> {
    queries::upsert_slot_unavailable(conn, date, time, booking_id)
}

pub fn release(conn: &Connection, booking_id: &str) -> anyhow::Result<usize> {
    queries::release_slots(conn, booking_id)
}

/// Takes the slot again for a booking restored from `cancelled`. A slot
/// already held by another live booking keeps its owner.
pub fn reserve(
    conn: &Connection,
    date: NaiveDate,
    time: &str,
    booking_id: &str,
) -> anyhow::Result<()> {
    if let Some(slot) = queries::get_slot(conn, date, time)? {
        if let Some(owner) = slot.booking_id.filter(|owner| owner != booking_id) {
            let owner_live = queries::get_booking_by_id(conn, &owner)?
                .is_some_and(|b| b.status != BookingStatus::Cancelled);
            if !slot.is_available && owner_live {
                tracing::warn!(
                    booking_id,
                    owner = %owner,
                    %date,
                    time,
                    "slot held by another booking, restored booking left without a slot"
                );
                return Ok(());
            }
        }
    }
    queries::upsert_slot_unavailable(conn, date, time, booking_id)
}

pub fn remove_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<usize> {
    queries::delete_slots_for_booking(conn, booking_id)
}
