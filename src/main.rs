use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use studio_booking::config::AppConfig;
use studio_booking::db;
use studio_booking::handlers;
use studio_booking::services::notifications::emailjs::EmailJsChannel;
use studio_booking::services::notifications::formsubmit::FormSubmitChannel;
use studio_booking::services::notifications::Notifier;
use studio_booking::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.notify_timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "http client build failed, using defaults");
            reqwest::Client::new()
        });

    if config.emailjs.is_configured() {
        tracing::info!("EmailJS configured (service: {})", config.emailjs.service_id);
    } else {
        tracing::warn!("EmailJS not configured, admin mail falls back to FormSubmit");
    }

    let notifier = Notifier::new(
        Box::new(EmailJsChannel::new(config.emailjs.clone(), client.clone())),
        Box::new(FormSubmitChannel::new(config.formsubmit_url.clone(), client)),
        config.admin_email.clone(),
        config.studio.clone(),
    );

    tracing::info!(
        campaign = %config.campaign.name,
        start = %config.campaign.start,
        end = %config.campaign.end,
        "campaign loaded"
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
