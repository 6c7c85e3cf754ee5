use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Channel, GeoLocation, InboundMessageEvent, MediaAttachment, StoredInboundMessage};

// ── Inbound messages ──

/// Inserts an event and returns its row id. A redelivered message sid keeps
/// the original row and returns its id.
pub fn insert_inbound_message(conn: &Connection, event: &InboundMessageEvent) -> anyhow::Result<i64> {
    let media = serde_json::to_string(&event.media)?;
    let (latitude, longitude) = match event.location {
        Some(loc) => (Some(loc.latitude), Some(loc.longitude)),
        None => (None, None),
    };

    conn.execute(
        "INSERT INTO inbound_messages (message_sid, from_number, to_number, body, media, latitude, longitude, channel, received_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(message_sid) DO NOTHING",
        params![
            event.message_sid,
            event.from,
            event.to,
            event.body,
            media,
            latitude,
            longitude,
            event.channel.as_str(),
            event.received_at.to_rfc3339(),
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM inbound_messages WHERE message_sid = ?1",
        params![event.message_sid],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_inbound_message(
    conn: &Connection,
    message_sid: &str,
) -> anyhow::Result<Option<StoredInboundMessage>> {
    let stored = conn
        .query_row(
            "SELECT id, message_sid, from_number, to_number, body, media, latitude, longitude, channel, received_at
             FROM inbound_messages WHERE message_sid = ?1",
            params![message_sid],
            row_to_stored,
        )
        .optional()?;
    Ok(stored)
}

pub fn list_inbound_messages(conn: &Connection, limit: i64) -> anyhow::Result<Vec<StoredInboundMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, message_sid, from_number, to_number, body, media, latitude, longitude, channel, received_at
         FROM inbound_messages ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit], row_to_stored)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredInboundMessage> {
    let media_json: String = row.get(5)?;
    let latitude: Option<f64> = row.get(6)?;
    let longitude: Option<f64> = row.get(7)?;
    let channel: String = row.get(8)?;
    let received_at: String = row.get(9)?;

    let media: Vec<MediaAttachment> = serde_json::from_str(&media_json).unwrap_or_default();
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoLocation { latitude, longitude }),
        _ => None,
    };
    let received_at = DateTime::parse_from_rfc3339(&received_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(StoredInboundMessage {
        id: row.get(0)?,
        event: InboundMessageEvent {
            message_sid: row.get(1)?,
            from: row.get(2)?,
            to: row.get(3)?,
            body: row.get(4)?,
            media,
            location,
            channel: Channel::parse(&channel),
            received_at,
        },
    })
}
