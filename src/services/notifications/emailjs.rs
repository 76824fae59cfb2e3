use async_trait::async_trait;
use serde_json::json;

use super::{DeliveryError, EmailChannel};
use crate::config::EmailJsConfig;
use crate::models::{ChannelTag, EmailType, OutgoingEmail};

pub struct EmailJsChannel {
    config: EmailJsConfig,
    client: reqwest::Client,
}

impl EmailJsChannel {
    pub fn new(config: EmailJsConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn template_id(&self, email_type: EmailType) -> &str {
        match email_type {
            EmailType::AdminNotification => &self.config.template_admin,
            EmailType::CustomerConfirmation => &self.config.template_customer,
        }
    }
}

#[async_trait]
impl EmailChannel for EmailJsChannel {
    fn tag(&self) -> ChannelTag {
        ChannelTag::EmailJs
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        if !self.config.is_configured() {
            return Err(DeliveryError::Unavailable(ChannelTag::EmailJs));
        }

        let body = json!({
            "service_id": self.config.service_id,
            "template_id": self.template_id(email.email_type),
            "user_id": self.config.public_key,
            "template_params": email.template_params,
        });

        let resp = self.client.post(&self.config.url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                channel: ChannelTag::EmailJs,
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(())
    }
}
