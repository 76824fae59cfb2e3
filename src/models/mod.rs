pub mod availability;
pub mod booking;
pub mod campaign;
pub mod notification;

pub use availability::{AvailableTimes, Period, SlotRecord, SESSION_MINUTES, SLOT_TIMES};
pub use booking::{slot_action, Booking, BookingInput, BookingStats, BookingStatus, SlotAction};
pub use campaign::{
    is_weekend, month_calendar, price_for, CalendarDay, Campaign, Unbookable, WEEKDAY_PRICE,
    WEEKEND_PRICE,
};
pub use notification::{
    ChannelTag, DeliveryOutcome, DeliveryStatus, DispatchResult, EmailNotification, EmailType,
    OutgoingEmail,
};
