use async_trait::async_trait;

use super::{DeliveryError, EmailChannel};
use crate::models::{ChannelTag, OutgoingEmail};

pub struct FormSubmitChannel {
    url: String,
    client: reqwest::Client,
}

impl FormSubmitChannel {
    pub fn new(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl EmailChannel for FormSubmitChannel {
    fn tag(&self) -> ChannelTag {
        ChannelTag::FormSubmit
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        if self.url.is_empty() {
            return Err(DeliveryError::Unavailable(ChannelTag::FormSubmit));
        }

        let resp = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("_subject", email.subject.as_str()),
                ("_message", email.body.as_str()),
                ("_captcha", "false"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                channel: ChannelTag::FormSubmit,
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(())
    }
}
