// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session CRUD operations.

use frontdesk_core::{FrontdeskError, HandoffStatus, Session};
use rusqlite::params;

use crate::database::Database;
use crate::queries::column_enum;

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        business_id: row.get(1)?,
        chat_key: row.get(2)?,
        handoff_status: column_enum(3, row.get::<_, String>(3)?)?,
        agent_response_pending: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Create a new session.
pub async fn create_session(db: &Database, session: &Session) -> Result<(), FrontdeskError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, business_id, chat_key, handoff_status,
                     agent_response_pending, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session.id,
                    session.business_id,
                    session.chat_key,
                    session.handoff_status.to_string(),
                    session.agent_response_pending,
                    session.created_at,
                    session.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<Session>, FrontdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, business_id, chat_key, handoff_status, agent_response_pending,
                        created_at, updated_at
                 FROM sessions WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_session);
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a session to a new handoff state and touch updated_at.
pub async fn set_handoff_status(
    db: &Database,
    id: &str,
    status: HandoffStatus,
) -> Result<(), FrontdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET handoff_status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag (or clear) the session as waiting on a tunneled operator reply.
pub async fn set_agent_response_pending(
    db: &Database,
    id: &str,
    pending: bool,
) -> Result<(), FrontdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET agent_response_pending = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![pending, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
