use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_BOOKING: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
    AdminNotification,
    CustomerConfirmation,
}

impl EmailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailType::AdminNotification => "admin_notification",
            EmailType::CustomerConfirmation => "customer_confirmation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin_notification" => Some(EmailType::AdminNotification),
            "customer_confirmation" => Some(EmailType::CustomerConfirmation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    LoggedOnly,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::LoggedOnly => "logged_only",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(DeliveryStatus::Sent),
            "logged_only" => Some(DeliveryStatus::LoggedOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelTag {
    EmailJs,
    FormSubmit,
}

impl ChannelTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelTag::EmailJs => "emailjs",
            ChannelTag::FormSubmit => "formsubmit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "emailjs" => Some(ChannelTag::EmailJs),
            "formsubmit" => Some(ChannelTag::FormSubmit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailNotification {
    pub id: String,
    pub booking_id: String,
    pub email_type: EmailType,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub status: DeliveryStatus,
    pub channel: Option<ChannelTag>,
    pub error_message: Option<String>,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub booking_id: String,
    pub email_type: EmailType,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub template_params: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent { channel: ChannelTag },
    LoggedOnly { last_error: String },
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub success: bool,
    pub admin: DeliveryOutcome,
    pub customer: DeliveryOutcome,
}
