// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The append-only per-session message log.
//!
//! Entries are never edited; the only destructive operation is
//! [`reset_session_log`], which replaces the whole log with a fresh
//! system entry.

use frontdesk_core::{ChatMessage, FrontdeskError, Role};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::queries::column_enum;

/// Build a log entry with a fresh id and timestamp.
pub fn new_chat_message(session_id: &str, role: Role, content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        role,
        content: content.into(),
        created_at: crate::now_timestamp(),
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<ChatMessage, rusqlite::Error> {
    Ok(ChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: column_enum(2, row.get::<_, String>(2)?)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Append an entry to the session log.
pub async fn append_message(db: &Database, message: &ChatMessage) -> Result<(), FrontdeskError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            insert(conn, &message)?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append an entry unless it repeats the log's most recent entry verbatim
/// (same role, same content). Returns whether the entry was written.
pub async fn append_unless_repeat(
    db: &Database,
    message: &ChatMessage,
) -> Result<bool, FrontdeskError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            let last: Option<(String, String)> = conn
                .query_row(
                    "SELECT role, content FROM messages
                     WHERE session_id = ?1 ORDER BY rowid DESC LIMIT 1",
                    params![message.session_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            if let Some((role, content)) = last {
                if role == message.role.to_string() && content == message.content {
                    return Ok(false);
                }
            }
            insert(conn, &message)?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The full session log in append order.
pub async fn session_log(
    db: &Database,
    session_id: &str,
) -> Result<Vec<ChatMessage>, FrontdeskError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, role, content, created_at
                 FROM messages WHERE session_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![session_id], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Drop the whole log and start over with a single system entry.
pub async fn reset_session_log(
    db: &Database,
    session_id: &str,
    system_prompt: &str,
) -> Result<(), FrontdeskError> {
    let system_entry = new_chat_message(session_id, Role::System, system_prompt);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM messages WHERE session_id = ?1",
                params![system_entry.session_id],
            )?;
            insert(&tx, &system_entry)?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn insert(conn: &rusqlite::Connection, message: &ChatMessage) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO messages (id, session_id, role, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            message.id,
            message.session_id,
            message.role.to_string(),
            message.content,
            message.created_at,
        ],
    )?;
    Ok(())
}
