use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::InboundMessageEvent;

/// Persistence for inbound events. Returns the record id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn store(&self, event: &InboundMessageEvent) -> anyhow::Result<i64>;
}

pub struct SqliteRecordStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn store(&self, event: &InboundMessageEvent) -> anyhow::Result<i64> {
        let db = self
            .db
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))?;
        queries::insert_inbound_message(&db, event)
    }
}
