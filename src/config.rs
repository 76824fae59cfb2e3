use std::env;

use chrono::NaiveDate;

use crate::models::Campaign;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_password: String,
    pub session_secret: String,
    pub admin_session_ttl_minutes: i64,
    pub admin_email: String,
    pub studio: StudioInfo,
    pub emailjs: EmailJsConfig,
    pub formsubmit_url: String,
    pub notify_timeout_secs: u64,
    pub campaign: Campaign,
}

#[derive(Clone, Debug)]
pub struct StudioInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Clone, Debug, Default)]
pub struct EmailJsConfig {
    pub url: String,
    pub service_id: String,
    pub public_key: String,
    pub template_admin: String,
    pub template_customer: String,
}

impl EmailJsConfig {
    pub fn is_configured(&self) -> bool {
        !self.service_id.is_empty()
            && !self.public_key.is_empty()
            && !self.template_admin.is_empty()
            && !self.template_customer.is_empty()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let admin_email =
            env::var("ADMIN_EMAIL").unwrap_or_else(|_| "studio@example.com".to_string());

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "studio_booking.db".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
            // A fresh secret per process invalidates old sessions on restart.
            session_secret: env::var("SESSION_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            admin_session_ttl_minutes: env::var("ADMIN_SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(480),
            formsubmit_url: env::var("FORMSUBMIT_URL")
                .unwrap_or_else(|_| format!("https://formsubmit.co/ajax/{admin_email}")),
            admin_email,
            studio: StudioInfo {
                name: env::var("STUDIO_NAME").unwrap_or_else(|_| "Photo Studio Haru".to_string()),
                phone: env::var("STUDIO_PHONE").unwrap_or_else(|_| "022-796-6733".to_string()),
                address: env::var("STUDIO_ADDRESS")
                    .unwrap_or_else(|_| "1-12-8 Tomizawa, Taihaku-ku, Sendai".to_string()),
            },
            emailjs: EmailJsConfig {
                url: env::var("EMAILJS_URL")
                    .unwrap_or_else(|_| "https://api.emailjs.com/api/v1.0/email/send".to_string()),
                service_id: env::var("EMAILJS_SERVICE_ID").unwrap_or_default(),
                public_key: env::var("EMAILJS_PUBLIC_KEY").unwrap_or_default(),
                template_admin: env::var("EMAILJS_TEMPLATE_ADMIN").unwrap_or_default(),
                template_customer: env::var("EMAILJS_TEMPLATE_CUSTOMER").unwrap_or_default(),
            },
            notify_timeout_secs: env::var("NOTIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            campaign: campaign_from_env(),
        }
    }
}

fn campaign_from_env() -> Campaign {
    let defaults = Campaign::default();
    Campaign {
        name: env::var("CAMPAIGN_NAME").unwrap_or(defaults.name),
        start: date_var("CAMPAIGN_START", defaults.start),
        end: date_var("CAMPAIGN_END", defaults.end),
        blackout_start: date_var("BLACKOUT_START", defaults.blackout_start),
        blackout_end: date_var("BLACKOUT_END", defaults.blackout_end),
    }
}

fn date_var(key: &str, default: NaiveDate) -> NaiveDate {
    match env::var(key) {
        Ok(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!(key, value = %raw, error = %e, "invalid date, using default");
                default
            }
        },
        Err(_) => default,
    }
}
