use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slotbook::config::AppConfig;
use slotbook::handlers;
use slotbook::ledger::{JsonFileStore, Ledger};
use slotbook::services::messaging::telegram::TelegramProvider;
use slotbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    anyhow::ensure!(!config.bot_token.is_empty(), "BOT_TOKEN must be set");
    anyhow::ensure!(!config.admin_id.is_empty(), "ADMIN_ID must be set");

    let ledger = Ledger::new(Box::new(JsonFileStore::new(&config.data_file)));
    tracing::info!(
        data_file = %config.data_file,
        bookings = ledger.list_all().len(),
        "booking ledger loaded"
    );

    let telegram = TelegramProvider::new(&config.telegram_api_url, config.bot_token.clone())?;
    if config.public_url.is_empty() {
        tracing::warn!("PUBLIC_URL not set, assuming the webhook is registered externally");
    } else {
        let url = format!("{}/webhook/telegram", config.public_url.trim_end_matches('/'));
        match telegram.set_webhook(&url, &config.webhook_secret).await {
            Ok(()) => tracing::info!(url = %url, "registered Telegram webhook"),
            Err(e) => tracing::error!(error = %e, "failed to register Telegram webhook"),
        }
    }

    let state = Arc::new(AppState::new(config.clone(), ledger, Box::new(telegram)));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webhook/telegram", post(handlers::webhook::telegram_webhook))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/cancel",
            post(handlers::admin::cancel_booking),
        )
        .route("/api/admin/slots", get(handlers::admin::get_slots))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
