use anyhow::Context;
use rusqlite::Connection;

/// Applied in order; each name is recorded once in `_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_inbound_messages",
    "CREATE TABLE inbound_messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_sid TEXT NOT NULL UNIQUE,
        from_number TEXT NOT NULL,
        to_number TEXT NOT NULL,
        body TEXT NOT NULL,
        media TEXT NOT NULL DEFAULT '[]',
        latitude REAL,
        longitude REAL,
        channel TEXT NOT NULL DEFAULT 'sms',
        received_at TEXT NOT NULL
    );
    CREATE INDEX idx_inbound_messages_received_at ON inbound_messages (received_at);",
)];

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}
