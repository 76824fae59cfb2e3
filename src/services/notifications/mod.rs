pub mod emailjs;
pub mod formsubmit;
pub mod templates;

use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::Connection;

use crate::config::StudioInfo;
use crate::db::queries;
use crate::models::{
    Booking, ChannelTag, DeliveryOutcome, DeliveryStatus, DispatchResult, EmailNotification,
    EmailType, OutgoingEmail,
};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("{} channel is not configured", .0.as_str())]
    Unavailable(ChannelTag),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{} returned {status}: {body}", .channel.as_str())]
    Rejected {
        channel: ChannelTag,
        status: u16,
        body: String,
    },
}

#[async_trait]
pub trait EmailChannel: Send + Sync {
    fn tag(&self) -> ChannelTag;
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError>;
}

pub struct Notifier {
    templated: Box<dyn EmailChannel>,
    relay: Box<dyn EmailChannel>,
    admin_email: String,
    studio: StudioInfo,
}

impl Notifier {
    pub fn new(
        templated: Box<dyn EmailChannel>,
        relay: Box<dyn EmailChannel>,
        admin_email: String,
        studio: StudioInfo,
    ) -> Self {
        Self {
            templated,
            relay,
            admin_email,
            studio,
        }
    }

    fn chain(&self, email_type: EmailType) -> Vec<&dyn EmailChannel> {
        match email_type {
            EmailType::AdminNotification => vec![self.templated.as_ref(), self.relay.as_ref()],
            EmailType::CustomerConfirmation => vec![self.templated.as_ref()],
        }
    }

    pub async fn notify(&self, db: &Mutex<Connection>, booking: &Booking) -> DispatchResult {
        let admin_email = templates::admin_notification(booking, &self.admin_email);
        let customer_email = templates::customer_confirmation(booking, &self.studio);

        let (admin, customer) = tokio::join!(
            self.deliver(db, &admin_email),
            self.deliver(db, &customer_email),
        );

        tracing::info!(
            booking_id = %booking.id,
            admin = ?admin,
            customer = ?customer,
            "booking notifications dispatched"
        );

        DispatchResult {
            success: true,
            admin,
            customer,
        }
    }

    pub async fn deliver(&self, db: &Mutex<Connection>, email: &OutgoingEmail) -> DeliveryOutcome {
        let mut last_error = String::from("no delivery channel available");

        for channel in self.chain(email.email_type) {
            let tag = channel.tag();
            match channel.send(email).await {
                Ok(()) => {
                    let body = match tag {
                        ChannelTag::EmailJs => serde_json::to_string(&email.template_params)
                            .unwrap_or_else(|_| email.body.clone()),
                        ChannelTag::FormSubmit => email.body.clone(),
                    };
                    record(db, email, DeliveryStatus::Sent, Some(tag), body, None);
                    return DeliveryOutcome::Sent { channel: tag };
                }
                Err(e) => {
                    tracing::warn!(
                        booking_id = %email.booking_id,
                        email_type = email.email_type.as_str(),
                        channel = tag.as_str(),
                        error = %e,
                        "email channel failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        tracing::warn!(
            booking_id = %email.booking_id,
            email_type = email.email_type.as_str(),
            to = %email.to,
            "all email channels failed, message logged for manual follow-up"
        );
        record(
            db,
            email,
            DeliveryStatus::LoggedOnly,
            None,
            email.body.clone(),
            Some(last_error.clone()),
        );
        DeliveryOutcome::LoggedOnly { last_error }
    }
}

fn record(
    db: &Mutex<Connection>,
    email: &OutgoingEmail,
    status: DeliveryStatus,
    channel: Option<ChannelTag>,
    body: String,
    error_message: Option<String>,
) {
    let entry = EmailNotification {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: email.booking_id.clone(),
        email_type: email.email_type,
        recipient_email: email.to.clone(),
        subject: email.subject.clone(),
        body,
        status,
        channel,
        error_message,
        sent_at: queries::now_timestamp(),
    };

    let result = match db.lock() {
        Ok(conn) => queries::insert_email_notification(&conn, &entry),
        Err(_) => Err(anyhow::anyhow!("database lock poisoned")),
    };

    if let Err(e) = result {
        tracing::error!(
            booking_id = %entry.booking_id,
            email_type = entry.email_type.as_str(),
            error = %e,
            "failed to write notification log"
        );
    }
}
