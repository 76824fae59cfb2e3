use serde_json::json;

use crate::config::StudioInfo;
use crate::models::notification::UNKNOWN_BOOKING;
use crate::models::{Booking, EmailType, OutgoingEmail, SESSION_MINUTES};

pub fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}¥{grouped}")
}

fn booking_ref(booking: &Booking) -> &str {
    if booking.id.is_empty() {
        UNKNOWN_BOOKING
    } else {
        &booking.id
    }
}

fn long_date(booking: &Booking) -> String {
    booking.booking_date.format("%A, %B %-d, %Y").to_string()
}

fn price_type(booking: &Booking) -> &'static str {
    if booking.is_weekend {
        "weekend"
    } else {
        "weekday"
    }
}

pub fn admin_notification(booking: &Booking, admin_email: &str) -> OutgoingEmail {
    let date = long_date(booking);
    let child_age = booking.child_age.as_deref().unwrap_or("not given");
    let requests = booking.requests.as_deref().unwrap_or("none");
    let total = format_yen(booking.total_price);

    let body = format!(
        "A new booking has arrived.\n\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Date: {date}\n\
         Time: {time}\n\
         Participants: {participants}\n\
         Price: {total} ({price_type})\n\
         Child age: {child_age}\n\
         Requests: {requests}\n\
         Booking ID: {id}\n\n\
         Remember to follow up with the customer.\n",
        name = booking.name,
        email = booking.email,
        phone = booking.phone,
        time = booking.booking_time,
        participants = booking.participants,
        price_type = price_type(booking),
        id = booking_ref(booking),
    );

    OutgoingEmail {
        booking_id: booking_ref(booking).to_string(),
        email_type: EmailType::AdminNotification,
        to: admin_email.to_string(),
        subject: format!(
            "[New booking] {} - {} {}",
            booking.name, booking.booking_date, booking.booking_time
        ),
        body,
        template_params: json!({
            "to_email": admin_email,
            "customer_name": booking.name,
            "customer_email": booking.email,
            "customer_phone": booking.phone,
            "booking_date": date,
            "booking_time": booking.booking_time,
            "participants": booking.participants,
            "total_price": total,
            "price_type": price_type(booking),
            "child_age": child_age,
            "requests": requests,
            "booking_id": booking_ref(booking),
        }),
    }
}

pub fn customer_confirmation(booking: &Booking, studio: &StudioInfo) -> OutgoingEmail {
    let date = long_date(booking);
    let total = format_yen(booking.total_price);

    let mut details = String::new();
    if let Some(age) = &booking.child_age {
        details.push_str(&format!("Child age: {age}\n"));
    }
    if let Some(requests) = &booking.requests {
        details.push_str(&format!("Requests: {requests}\n"));
    }

    let body = format!(
        "Dear {name},\n\n\
         Thank you for booking the {campaign} at {studio_name}.\n\
         Your booking is confirmed:\n\n\
         Date: {date}\n\
         Time: {time} ({SESSION_MINUTES} minutes)\n\
         Participants: {participants}\n\
         Price: {total} ({price_type})\n\
         {details}\n\
         On the day:\n\
         - Please arrive 10 minutes before your session.\n\
         - We select your favourite shot and deliver the data by email within a week.\n\
         - To cancel, please call us by the day before.\n\n\
         {studio_name}\n\
         {address}\n\
         Tel: {phone}\n",
        name = booking.name,
        campaign = booking.campaign_type,
        studio_name = studio.name,
        time = booking.booking_time,
        participants = booking.participants,
        price_type = price_type(booking),
        address = studio.address,
        phone = studio.phone,
    );

    OutgoingEmail {
        booking_id: booking_ref(booking).to_string(),
        email_type: EmailType::CustomerConfirmation,
        to: booking.email.clone(),
        subject: format!("[Booking confirmed] {} - thank you for your booking", booking.campaign_type),
        body,
        template_params: json!({
            "to_email": booking.email,
            "customer_name": booking.name,
            "booking_date": date,
            "booking_time": booking.booking_time,
            "participants": booking.participants,
            "total_price": total,
            "price_type": price_type(booking),
            "child_age": booking.child_age.as_deref().unwrap_or(""),
            "requests": booking.requests.as_deref().unwrap_or(""),
            "studio_phone": studio.phone,
            "studio_address": studio.address,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{NaiveDate, NaiveDateTime};

    fn booking() -> Booking {
        let ts = NaiveDateTime::parse_from_str("2025-07-20 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: "b-123".to_string(),
            name: "Taro Yamada".to_string(),
            email: "t@example.com".to_string(),
            phone: "090-1234-5678".to_string(),
            participants: 2,
            child_age: Some("3".to_string()),
            requests: None,
            booking_date: NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
            booking_time: "10:00".to_string(),
            is_weekend: true,
            base_price: 7700,
            total_price: 7700,
            campaign_type: "Summer Photo Campaign".to_string(),
            status: BookingStatus::Confirmed,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn studio() -> StudioInfo {
        StudioInfo {
            name: "Photo Studio Haru".to_string(),
            phone: "022-796-6733".to_string(),
            address: "Sendai".to_string(),
        }
    }

    #[test]
    fn test_format_yen() {
        assert_eq!(format_yen(0), "¥0");
        assert_eq!(format_yen(500), "¥500");
        assert_eq!(format_yen(5500), "¥5,500");
        assert_eq!(format_yen(1234567), "¥1,234,567");
        assert_eq!(format_yen(-7700), "-¥7,700");
    }

    #[test]
    fn test_admin_notification() {
        let email = admin_notification(&booking(), "studio@example.com");
        assert_eq!(email.to, "studio@example.com");
        assert_eq!(email.email_type, EmailType::AdminNotification);
        assert_eq!(email.subject, "[New booking] Taro Yamada - 2025-08-02 10:00");
        assert!(email.body.contains("Price: ¥7,700 (weekend)"));
        assert!(email.body.contains("Date: Saturday, August 2, 2025"));
        assert!(email.body.contains("Requests: none"));
        assert_eq!(email.template_params["booking_id"], "b-123");
    }

    #[test]
    fn test_customer_confirmation() {
        let email = customer_confirmation(&booking(), &studio());
        assert_eq!(email.to, "t@example.com");
        assert!(email.body.contains("Dear Taro Yamada"));
        assert!(email.body.contains("Time: 10:00 (20 minutes)"));
        assert!(email.body.contains("Child age: 3"));
        assert!(!email.body.contains("Requests:"));
        assert_eq!(email.template_params["studio_phone"], "022-796-6733");
    }

    #[test]
    fn test_missing_id_uses_placeholder() {
        let mut b = booking();
        b.id = String::new();
        let email = admin_notification(&b, "studio@example.com");
        assert_eq!(email.booking_id, UNKNOWN_BOOKING);
        assert!(email.body.contains("Booking ID: unknown"));
    }
}
