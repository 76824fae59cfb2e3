use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::availability::is_valid_slot;
use crate::models::booking::{MAX_PARTICIPANTS, MIN_PARTICIPANTS};
use crate::models::{
    is_weekend, price_for, slot_action, Booking, BookingInput, BookingStatus, Campaign,
    EmailNotification, SlotAction, Unbookable,
};
use crate::services::availability;

pub fn validate(input: &BookingInput, campaign: &Campaign, today: NaiveDate) -> Result<(), AppError> {
    for (field, value) in [
        ("name", &input.name),
        ("email", &input.email),
        ("phone", &input.phone),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    if !input.email.contains('@') {
        return Err(AppError::Validation("email address is malformed".to_string()));
    }

    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&input.participants) {
        return Err(AppError::Validation(format!(
            "participants must be between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS}"
        )));
    }

    if !is_valid_slot(&input.time) {
        return Err(AppError::Validation(format!("{} is not a bookable time", input.time)));
    }

    match campaign.unbookable_reason(input.date, today) {
        None => Ok(()),
        Some(Unbookable::Past) => Err(AppError::Validation(format!("{} is in the past", input.date))),
        Some(Unbookable::OutsideCampaign) => Err(AppError::Validation(format!(
            "{} is outside the campaign ({} to {})",
            input.date, campaign.start, campaign.end
        ))),
        Some(Unbookable::Blackout) => Err(AppError::Validation(format!(
            "no sessions are offered on {}",
            input.date
        ))),
    }
}

pub fn create(conn: &Connection, campaign: &Campaign, input: BookingInput) -> Result<Booking, AppError> {
    let weekend = is_weekend(input.date);
    let price = price_for(input.date);

    if input.is_weekend.is_some_and(|w| w != weekend)
        || input.base_price.is_some_and(|p| p != price)
        || input.total_price.is_some_and(|p| p != price)
    {
        tracing::warn!(
            date = %input.date,
            client_weekend = ?input.is_weekend,
            client_total = ?input.total_price,
            price,
            "client pricing disagrees with server, using server pricing"
        );
    }

    let now = queries::now_timestamp();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: input.phone.trim().to_string(),
        participants: input.participants,
        child_age: non_blank(input.child_age),
        requests: non_blank(input.requests),
        booking_date: input.date,
        booking_time: input.time,
        is_weekend: weekend,
        base_price: price,
        total_price: price,
        campaign_type: input
            .campaign_type
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| campaign.name.clone()),
        status: BookingStatus::Confirmed,
        created_at: now,
        updated_at: now,
    };

    let mut tx = conn.unchecked_transaction()?;
    queries::insert_booking(&tx, &booking)?;

    let slot_marked = db::best_effort(&mut tx, "mark slot unavailable", &booking.id, |c| {
        availability::mark_unavailable(c, booking.booking_date, &booking.booking_time, &booking.id)
    });
    tx.commit()?;

    tracing::info!(
        booking_id = %booking.id,
        date = %booking.booking_date,
        time = %booking.booking_time,
        total_price = booking.total_price,
        slot_marked = slot_marked.is_some(),
        "booking created"
    );

    Ok(booking)
}

pub fn list_all(conn: &Connection, status_filter: Option<BookingStatus>) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings(conn, status_filter)?)
}

pub fn get(conn: &Connection, id: &str) -> Result<Booking, AppError> {
    queries::get_booking_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

pub fn update_status(conn: &Connection, id: &str, new_status: BookingStatus) -> Result<Booking, AppError> {
    let existing = get(conn, id)?;

    if existing.status == new_status {
        tracing::info!(booking_id = id, status = new_status.as_str(), "status unchanged");
        return Ok(existing);
    }

    let now = queries::now_timestamp();
    let mut tx = conn.unchecked_transaction()?;
    if !queries::update_booking_status(&tx, id, new_status, &now)? {
        return Err(AppError::NotFound(format!("booking {id}")));
    }

    let action = slot_action(existing.status, new_status);
    let reconciled = match action {
        SlotAction::Release => {
            db::best_effort(&mut tx, "release slot", id, |c| availability::release(c, id)).is_some()
        }
        SlotAction::Reserve => db::best_effort(&mut tx, "reserve slot", id, |c| {
            availability::reserve(c, existing.booking_date, &existing.booking_time, id)
        })
        .is_some(),
        SlotAction::None => true,
    };
    tx.commit()?;

    tracing::info!(
        booking_id = id,
        from = existing.status.as_str(),
        to = new_status.as_str(),
        slot_action = ?action,
        reconciled,
        "booking status updated"
    );

    Ok(Booking {
        status: new_status,
        updated_at: now,
        ..existing
    })
}

pub fn delete(conn: &Connection, id: &str) -> Result<Booking, AppError> {
    let booking = get(conn, id)?;

    let mut tx = conn.unchecked_transaction()?;
    let logs = db::best_effort(&mut tx, "delete notification log", id, |c| {
        queries::delete_email_notifications(c, id)
    });
    let slots = db::best_effort(&mut tx, "remove slot", id, |c| {
        availability::remove_for_booking(c, id)
    });

    if !queries::delete_booking(&tx, id)? {
        return Err(AppError::NotFound(format!("booking {id}")));
    }
    tx.commit()?;

    tracing::info!(
        booking_id = id,
        notifications_removed = ?logs,
        slots_removed = ?slots,
        "booking deleted"
    );

    Ok(booking)
}

pub fn notifications_for(conn: &Connection, booking_id: &str) -> Result<Vec<EmailNotification>, AppError> {
    Ok(queries::list_email_notifications(conn, booking_id)?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryStatus, EmailType, WEEKDAY_PRICE, WEEKEND_PRICE};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        d("2025-08-01")
    }

    fn input(date: &str, time: &str) -> BookingInput {
        BookingInput {
            name: "Taro Yamada".to_string(),
            email: "t@example.com".to_string(),
            phone: "090-1234-5678".to_string(),
            participants: 2,
            child_age: None,
            requests: None,
            date: d(date),
            time: time.to_string(),
            is_weekend: None,
            base_price: None,
            total_price: None,
            campaign_type: None,
        }
    }

    fn log_entry(booking_id: &str) -> EmailNotification {
        EmailNotification {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking_id.to_string(),
            email_type: EmailType::AdminNotification,
            recipient_email: "studio@example.com".to_string(),
            subject: "New booking".to_string(),
            body: "body".to_string(),
            status: DeliveryStatus::LoggedOnly,
            channel: None,
            error_message: Some("offline".to_string()),
            sent_at: queries::now_timestamp(),
        }
    }

    #[test]
    fn test_validate_accepts_good_input() {
        assert!(validate(&input("2025-08-02", "10:00"), &Campaign::default(), today()).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let c = Campaign::default();
        let mut i = input("2025-08-02", "10:00");
        i.phone = "  ".to_string();
        assert!(matches!(validate(&i, &c, today()), Err(AppError::Validation(_))));

        let mut i = input("2025-08-02", "10:00");
        i.email = "not-an-email".to_string();
        assert!(matches!(validate(&i, &c, today()), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_participants_out_of_range() {
        let c = Campaign::default();
        for n in [0, 11] {
            let mut i = input("2025-08-02", "10:00");
            i.participants = n;
            assert!(matches!(validate(&i, &c, today()), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_rejects_unbookable_date_and_time() {
        let c = Campaign::default();
        assert!(validate(&input("2025-08-02", "12:00"), &c, today()).is_err());
        assert!(validate(&input("2025-08-13", "10:00"), &c, today()).is_err());
        assert!(validate(&input("2025-09-08", "10:00"), &c, today()).is_err());
        assert!(validate(&input("2025-08-02", "10:00"), &c, d("2025-08-03")).is_err());
    }

    #[test]
    fn test_create_weekend_booking() {
        let conn = setup_db();
        // 2025-08-02 is a Saturday
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "10:00")).unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.is_weekend);
        assert_eq!(booking.base_price, WEEKEND_PRICE);
        assert_eq!(booking.total_price, WEEKEND_PRICE);
        assert_eq!(booking.campaign_type, "Summer Photo Campaign");

        let slot = queries::get_slot(&conn, d("2025-08-02"), "10:00").unwrap().unwrap();
        assert!(!slot.is_available);
        assert_eq!(slot.booking_id.as_deref(), Some(booking.id.as_str()));

        let stored = get(&conn, &booking.id).unwrap();
        assert_eq!(stored.name, "Taro Yamada");
        assert_eq!(stored.booking_date, d("2025-08-02"));
    }

    #[test]
    fn test_create_ignores_client_pricing() {
        let conn = setup_db();
        // 2025-08-04 is a Monday
        let mut i = input("2025-08-04", "13:30");
        i.is_weekend = Some(true);
        i.total_price = Some(1);
        let booking = create(&conn, &Campaign::default(), i).unwrap();
        assert!(!booking.is_weekend);
        assert_eq!(booking.total_price, WEEKDAY_PRICE);
    }

    #[test]
    fn test_create_survives_slot_write_failure() {
        let conn = setup_db();
        conn.execute_batch("DROP TABLE time_slots").unwrap();

        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "10:00")).unwrap();
        assert!(get(&conn, &booking.id).is_ok());
    }

    #[test]
    fn test_create_fails_when_insert_fails() {
        let conn = setup_db();
        conn.execute_batch("DROP TABLE bookings").unwrap();

        let result = create(&conn, &Campaign::default(), input("2025-08-02", "10:00"));
        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert!(availability::list_booked_times(&conn, d("2025-08-02")).unwrap().is_empty());
    }

    #[test]
    fn test_list_all_orders_by_date() {
        let conn = setup_db();
        let c = Campaign::default();
        create(&conn, &c, input("2025-08-20", "10:00")).unwrap();
        create(&conn, &c, input("2025-08-05", "14:00")).unwrap();
        create(&conn, &c, input("2025-08-05", "10:30")).unwrap();

        let all = list_all(&conn, None).unwrap();
        let keys: Vec<_> = all
            .iter()
            .map(|b| (b.booking_date.to_string(), b.booking_time.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2025-08-05".to_string(), "10:30".to_string()),
                ("2025-08-05".to_string(), "14:00".to_string()),
                ("2025-08-20".to_string(), "10:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_all_includes_every_status_and_filters() {
        let conn = setup_db();
        let c = Campaign::default();
        let a = create(&conn, &c, input("2025-08-05", "10:00")).unwrap();
        create(&conn, &c, input("2025-08-05", "10:30")).unwrap();
        update_status(&conn, &a.id, BookingStatus::Cancelled).unwrap();

        assert_eq!(list_all(&conn, None).unwrap().len(), 2);
        let cancelled = list_all(&conn, Some(BookingStatus::Cancelled)).unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, a.id);
    }

    #[test]
    fn test_cancel_releases_and_restore_reserves() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "10:00")).unwrap();

        let cancelled = update_status(&conn, &booking.id, BookingStatus::Cancelled).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(!availability::list_booked_times(&conn, d("2025-08-02"))
            .unwrap()
            .contains("10:00"));

        update_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();
        let slot = queries::get_slot(&conn, d("2025-08-02"), "10:00").unwrap().unwrap();
        assert!(!slot.is_available);
        assert_eq!(slot.booking_id.as_deref(), Some(booking.id.as_str()));
    }

    #[test]
    fn test_restore_does_not_take_slot_from_live_booking() {
        let conn = setup_db();
        let c = Campaign::default();
        let first = create(&conn, &c, input("2025-08-02", "10:00")).unwrap();
        update_status(&conn, &first.id, BookingStatus::Cancelled).unwrap();
        let second = create(&conn, &c, input("2025-08-02", "10:00")).unwrap();

        let restored = update_status(&conn, &first.id, BookingStatus::Confirmed).unwrap();
        assert_eq!(restored.status, BookingStatus::Confirmed);
        let slot = queries::get_slot(&conn, d("2025-08-02"), "10:00").unwrap().unwrap();
        assert_eq!(slot.booking_id.as_deref(), Some(second.id.as_str()));

        update_status(&conn, &first.id, BookingStatus::Cancelled).unwrap();
        assert_eq!(get(&conn, &second.id).unwrap().status, BookingStatus::Confirmed);
        assert!(availability::list_booked_times(&conn, d("2025-08-02"))
            .unwrap()
            .contains("10:00"));
    }

    #[test]
    fn test_confirmed_to_completed_keeps_slot() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "11:00")).unwrap();

        let done = update_status(&conn, &booking.id, BookingStatus::Completed).unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert!(availability::list_booked_times(&conn, d("2025-08-02"))
            .unwrap()
            .contains("11:00"));

        assert_eq!(get(&conn, &booking.id).unwrap().status, BookingStatus::Completed);
    }

    #[test]
    fn test_same_status_is_noop() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "11:00")).unwrap();
        let same = update_status(&conn, &booking.id, BookingStatus::Confirmed).unwrap();
        assert_eq!(same.status, BookingStatus::Confirmed);
        assert_eq!(same.updated_at, booking.updated_at);
    }

    #[test]
    fn test_update_status_missing_booking() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "11:00")).unwrap();

        let result = update_status(&conn, "missing", BookingStatus::Cancelled);
        assert!(matches!(result, Err(AppError::NotFound(_))));

        assert_eq!(get(&conn, &booking.id).unwrap().status, BookingStatus::Confirmed);
        assert!(availability::list_booked_times(&conn, d("2025-08-02"))
            .unwrap()
            .contains("11:00"));
    }

    #[test]
    fn test_status_change_survives_slot_failure() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "11:00")).unwrap();
        conn.execute_batch("DROP TABLE time_slots").unwrap();

        let cancelled = update_status(&conn, &booking.id, BookingStatus::Cancelled).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(get(&conn, &booking.id).unwrap().status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_delete_cascades() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "15:00")).unwrap();
        queries::insert_email_notification(&conn, &log_entry(&booking.id)).unwrap();
        queries::insert_email_notification(&conn, &log_entry("other")).unwrap();

        let deleted = delete(&conn, &booking.id).unwrap();
        assert_eq!(deleted.id, booking.id);

        assert!(list_all(&conn, None).unwrap().is_empty());
        assert!(notifications_for(&conn, &booking.id).unwrap().is_empty());
        assert_eq!(notifications_for(&conn, "other").unwrap().len(), 1);
        assert!(queries::get_slot(&conn, d("2025-08-02"), "15:00").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_booking() {
        let conn = setup_db();
        assert!(matches!(delete(&conn, "missing"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_delete_survives_log_cleanup_failure() {
        let conn = setup_db();
        let booking = create(&conn, &Campaign::default(), input("2025-08-02", "15:00")).unwrap();
        conn.execute_batch("DROP TABLE email_notifications").unwrap();

        delete(&conn, &booking.id).unwrap();
        assert!(matches!(get(&conn, &booking.id), Err(AppError::NotFound(_))));
        assert!(queries::get_slot(&conn, d("2025-08-02"), "15:00").unwrap().is_none());
    }

    #[test]
    fn test_racing_bookings_leave_single_owner() {
        let conn = setup_db();
        let c = Campaign::default();
        // Both customers saw 10:00 open before either booking landed.
        let first = create(&conn, &c, input("2025-08-02", "10:00")).unwrap();
        let second = create(&conn, &c, input("2025-08-02", "10:00")).unwrap();

        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM time_slots WHERE date = '2025-08-02' AND time = '10:00'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);

        let slot = queries::get_slot(&conn, d("2025-08-02"), "10:00").unwrap().unwrap();
        assert!(!slot.is_available);
        let owner = slot.booking_id.unwrap();
        assert!(owner == first.id || owner == second.id);
        assert_eq!(owner, second.id);
    }

    #[test]
    fn test_stats_exclude_cancelled_revenue() {
        let conn = setup_db();
        let c = Campaign::default();
        let sat = create(&conn, &c, input("2025-08-02", "10:00")).unwrap();
        let mon = create(&conn, &c, input("2025-08-04", "10:00")).unwrap();
        create(&conn, &c, input("2025-08-05", "10:00")).unwrap();
        update_status(&conn, &sat.id, BookingStatus::Cancelled).unwrap();
        update_status(&conn, &mon.id, BookingStatus::Completed).unwrap();

        let stats = queries::booking_stats(&conn).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.revenue, 2 * WEEKDAY_PRICE);
    }
}
