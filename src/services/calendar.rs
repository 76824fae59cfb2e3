use chrono::Duration;

use crate::config::StudioInfo;
use crate::models::availability::parse_slot_time;
use crate::models::{Booking, SESSION_MINUTES};

pub fn generate_ics(booking: &Booking, studio: &StudioInfo) -> anyhow::Result<String> {
    let start = booking
        .booking_date
        .and_time(parse_slot_time(&booking.booking_time)?);
    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = (start + Duration::minutes(SESSION_MINUTES))
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = booking.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@studio-booking", booking.id);

    let summary = format!("{} at {}", booking.campaign_type, studio.name);
    let description = format!(
        "{} participant(s). Please arrive 10 minutes early. Tel: {}",
        booking.participants, studio.phone
    );

    Ok(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Studio Booking//Campaign Sessions//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n",
        location = escape_text(&studio.address),
        summary = escape_text(&summary),
        description = escape_text(&description),
    ))
}

fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use crate::models::BookingStatus;

    fn booking(time: &str) -> Booking {
        let ts = NaiveDateTime::parse_from_str("2025-07-20 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: "test-123".to_string(),
            name: "Taro Yamada".to_string(),
            email: "t@example.com".to_string(),
            phone: "090-1234-5678".to_string(),
            participants: 3,
            child_age: None,
            requests: None,
            booking_date: NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
            booking_time: time.to_string(),
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
            address: "1-12-8 Tomizawa, Sendai".to_string(),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&booking("16:30"), &studio()).unwrap();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("DTSTART:20250802T163000"));
        assert!(ics.contains("DTEND:20250802T165000"));
        assert!(ics.contains("DTSTAMP:20250720T090000Z"));
        assert!(ics.contains("UID:test-123@studio-booking"));
        assert!(ics.contains("SUMMARY:Summer Photo Campaign at Photo Studio Haru"));
        assert!(ics.contains("LOCATION:1-12-8 Tomizawa\\, Sendai"));
        assert!(ics.contains("DESCRIPTION:3 participant(s)."));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_generate_ics_bad_time() {
        assert!(generate_ics(&booking("noon"), &studio()).is_err());
    }
}
