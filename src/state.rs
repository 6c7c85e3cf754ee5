use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::messaging::ProviderClient;
use crate::services::webhook::WebhookHandler;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub provider: ProviderClient,
    pub webhook: WebhookHandler,
}
