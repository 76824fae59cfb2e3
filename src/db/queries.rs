use std::collections::BTreeSet;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    Booking, BookingStats, BookingStatus, ChannelTag, DeliveryStatus, EmailNotification,
    EmailType, SlotRecord,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_timestamp() -> NaiveDateTime {
    // Whole seconds, so values round-trip through the text column.
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid timestamp in database: {s}"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("invalid date in database: {s}"))
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, name, email, phone, participants, child_age, requests, \
     booking_date, booking_time, is_weekend, base_price, total_price, campaign_type, status, \
     created_at, updated_at";

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, name, email, phone, participants, child_age, requests,
                               booking_date, booking_time, is_weekend, base_price, total_price,
                               campaign_type, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            booking.id,
            booking.name,
            booking.email,
            booking.phone,
            booking.participants,
            booking.child_age,
            booking.requests,
            fmt_date(booking.booking_date),
            booking.booking_time,
            booking.is_weekend,
            booking.base_price,
            booking.total_price,
            booking.campaign_type,
            booking.status.as_str(),
            fmt_ts(&booking.created_at),
            fmt_ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_bookings(
    conn: &Connection,
    status_filter: Option<BookingStatus>,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE ?1 IS NULL OR status = ?1
         ORDER BY booking_date ASC, booking_time ASC, created_at ASC"
    ))?;

    let rows = stmt.query_map(params![status_filter.map(|s| s.as_str())], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
    updated_at: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), fmt_ts(updated_at), id],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn booking_stats(conn: &Connection) -> anyhow::Result<BookingStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(status = 'confirmed'), 0),
                COALESCE(SUM(status = 'cancelled'), 0),
                COALESCE(SUM(status = 'completed'), 0),
                COALESCE(SUM(CASE WHEN status != 'cancelled' THEN total_price ELSE 0 END), 0)
         FROM bookings",
        [],
        |row| {
            Ok(BookingStats {
                total: row.get(0)?,
                confirmed: row.get(1)?,
                cancelled: row.get(2)?,
                completed: row.get(3)?,
                revenue: row.get(4)?,
            })
        },
    )?;
    Ok(stats)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let booking_date: String = row.get(7)?;
    let status: String = row.get(13)?;
    let created_at: String = row.get(14)?;
    let updated_at: String = row.get(15)?;

    Ok(Booking {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        participants: row.get(4)?,
        child_age: row.get(5)?,
        requests: row.get(6)?,
        booking_date: parse_date(&booking_date)?,
        booking_time: row.get(8)?,
        is_weekend: row.get(9)?,
        base_price: row.get(10)?,
        total_price: row.get(11)?,
        campaign_type: row.get(12)?,
        status: BookingStatus::parse(&status)
            .with_context(|| format!("unknown booking status in database: {status}"))?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

// ── Time Slots ──

pub fn list_booked_times(conn: &Connection, date: NaiveDate) -> anyhow::Result<BTreeSet<String>> {
    let mut stmt =
        conn.prepare("SELECT time FROM time_slots WHERE date = ?1 AND is_available = 0")?;
    let rows = stmt.query_map(params![fmt_date(date)], |row| row.get::<_, String>(0))?;

    let mut times = BTreeSet::new();
    for row in rows {
        let time = row?;
        // Tolerate HH:MM:SS values written by older clients.
        times.insert(time.get(..5).unwrap_or(time.as_str()).to_string());
    }
    Ok(times)
}

pub fn get_slot(conn: &Connection, date: NaiveDate, time: &str) -> anyhow::Result<Option<SlotRecord>> {
    let row = conn
        .query_row(
            "SELECT date, time, is_available, booking_id, updated_at
             FROM time_slots WHERE date = ?1 AND time = ?2",
            params![fmt_date(date), time],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((date, time, is_available, booking_id, updated_at)) => Ok(Some(SlotRecord {
            date: parse_date(&date)?,
            time,
            is_available,
            booking_id,
            updated_at: parse_ts(&updated_at)?,
        })),
        None => Ok(None),
    }
}

pub fn upsert_slot_unavailable(
    conn: &Connection,
    date: NaiveDate,
    time: &str,
    booking_id: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO time_slots (date, time, is_available, booking_id, updated_at)
         VALUES (?1, ?2, 0, ?3, ?4)
         ON CONFLICT(date, time) DO UPDATE SET
           is_available = 0,
           booking_id = excluded.booking_id,
           updated_at = excluded.updated_at",
        params![fmt_date(date), time, booking_id, fmt_ts(&now_timestamp())],
    )?;
    Ok(())
}

pub fn release_slots(conn: &Connection, booking_id: &str) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE time_slots SET is_available = 1, booking_id = NULL, updated_at = ?1
         WHERE booking_id = ?2",
        params![fmt_ts(&now_timestamp()), booking_id],
    )?;
    Ok(count)
}

pub fn delete_slots_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<usize> {
    let count = conn.execute(
        "DELETE FROM time_slots WHERE booking_id = ?1",
        params![booking_id],
    )?;
    Ok(count)
}

// ── Email Notifications ──

pub fn insert_email_notification(
    conn: &Connection,
    entry: &EmailNotification,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO email_notifications (id, booking_id, email_type, recipient_email, subject,
                                          body, status, channel, error_message, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.id,
            entry.booking_id,
            entry.email_type.as_str(),
            entry.recipient_email,
            entry.subject,
            entry.body,
            entry.status.as_str(),
            entry.channel.map(|c| c.as_str()),
            entry.error_message,
            fmt_ts(&entry.sent_at),
        ],
    )?;
    Ok(())
}

pub fn list_email_notifications(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Vec<EmailNotification>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, email_type, recipient_email, subject, body, status, channel,
                error_message, sent_at
         FROM email_notifications WHERE booking_id = ?1
         ORDER BY sent_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| Ok(parse_notification_row(row)))?;

    let mut entries = vec![];
    for row in rows {
        entries.push(row??);
    }
    Ok(entries)
}

pub fn delete_email_notifications(conn: &Connection, booking_id: &str) -> anyhow::Result<usize> {
    let count = conn.execute(
        "DELETE FROM email_notifications WHERE booking_id = ?1",
        params![booking_id],
    )?;
    Ok(count)
}

fn parse_notification_row(row: &rusqlite::Row) -> anyhow::Result<EmailNotification> {
    let email_type: String = row.get(2)?;
    let status: String = row.get(6)?;
    let channel: Option<String> = row.get(7)?;
    let sent_at: String = row.get(9)?;

    Ok(EmailNotification {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        email_type: EmailType::parse(&email_type)
            .with_context(|| format!("unknown email type in database: {email_type}"))?,
        recipient_email: row.get(3)?,
        subject: row.get(4)?,
        body: row.get(5)?,
        status: DeliveryStatus::parse(&status)
            .with_context(|| format!("unknown delivery status in database: {status}"))?,
        channel: channel.as_deref().and_then(ChannelTag::parse),
        error_message: row.get(8)?,
        sent_at: parse_ts(&sent_at)?,
    })
}

// ── Store check ──

pub struct StoreCheck {
    pub booking_count: i64,
    pub write_access: bool,
    pub delete_access: bool,
}

pub fn check_store(conn: &Connection) -> anyhow::Result<StoreCheck> {
    const PROBE_ID: &str = "00000000-0000-0000-0000-000000000000";

    let booking_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?;

    let write_access = conn
        .execute(
            "UPDATE bookings SET status = 'confirmed' WHERE id = ?1",
            params![PROBE_ID],
        )
        .map_err(|e| tracing::warn!(error = %e, "store write probe failed"))
        .is_ok();

    let delete_access = conn
        .execute("DELETE FROM bookings WHERE id = ?1", params![PROBE_ID])
        .map_err(|e| tracing::warn!(error = %e, "store delete probe failed"))
        .is_ok();

    Ok(StoreCheck {
        booking_count,
        write_access,
        delete_access,
    })
}
