use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use smsgate::config::AppConfig;
use smsgate::db;
use smsgate::handlers;
use smsgate::services::messaging::{ProviderClient, TwilioHttpTransport};
use smsgate::services::store::SqliteRecordStore;
use smsgate::services::webhook::WebhookHandler;
use smsgate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    if config.twilio_account_sid.is_empty() {
        tracing::warn!("TWILIO_ACCOUNT_SID not set, outbound sends will be rejected by the provider");
    }
    if !config.validates_signatures() {
        tracing::warn!("TWILIO_AUTH_TOKEN not set, webhook signatures are not checked");
    }

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let provider = ProviderClient::new(
        config.credentials(),
        &config.twilio_api_base,
        config.request_timeout(),
        Box::new(TwilioHttpTransport::new()),
    );
    let webhook = WebhookHandler::new(
        Arc::new(SqliteRecordStore::new(Arc::clone(&db))),
        config.auto_reply.clone(),
    );

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        provider,
        webhook,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webhook/sms", post(handlers::webhook::sms_webhook))
        .route("/api/messages", post(handlers::messages::send_message))
        .route(
            "/api/messages/:sid",
            get(handlers::messages::get_message_status),
        )
        .route("/api/inbound", get(handlers::messages::list_inbound))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
