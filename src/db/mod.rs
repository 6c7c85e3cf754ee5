pub mod migrations;
pub mod queries;

use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

/// Opens the record store database and brings its schema up to date.
/// `:memory:` gives a private in-memory database (used by tests).
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = if path == ":memory:" {
        Connection::open_in_memory().context("failed to open in-memory database")?
    } else {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create database directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("failed to enable WAL")?;
        conn
    };

    migrations::run_migrations(&conn)?;
    tracing::info!(path, "record store ready");

    Ok(conn)
}
