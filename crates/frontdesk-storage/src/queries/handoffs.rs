// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handoff request persistence.

use frontdesk_core::{FrontdeskError, HandoffRequest, HandoffRequestStatus};
use rusqlite::params;

use crate::database::Database;
use crate::queries::column_enum;

const COLUMNS: &str = "id, business_id, session_id, operator_message_id, status, created_at";

fn row_to_request(row: &rusqlite::Row<'_>) -> Result<HandoffRequest, rusqlite::Error> {
    Ok(HandoffRequest {
        id: row.get(0)?,
        business_id: row.get(1)?,
        session_id: row.get(2)?,
        operator_message_id: row.get(3)?,
        status: column_enum(4, row.get::<_, String>(4)?)?,
        created_at: row.get(5)?,
    })
}

/// Open a new pending handoff request; returns the assigned row id.
pub async fn create_request(
    db: &Database,
    business_id: &str,
    session_id: &str,
) -> Result<i64, FrontdeskError> {
    let business_id = business_id.to_string();
    let session_id = session_id.to_string();
    let created_at = crate::now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO handoff_requests (business_id, session_id, status, created_at)
                 VALUES (?1, ?2, 'pending', ?3)",
                params![business_id, session_id, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a handoff request by row id.
pub async fn get_request(db: &Database, id: i64) -> Result<Option<HandoffRequest>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM handoff_requests WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_request);
            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The still-pending request for a session, if one exists.
pub async fn pending_request_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Option<HandoffRequest>, FrontdeskError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM handoff_requests
                 WHERE session_id = ?1 AND status = 'pending'
                 ORDER BY id DESC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![session_id], row_to_request);
            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The newest request for a session regardless of status.
pub async fn latest_request_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Option<HandoffRequest>, FrontdeskError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM handoff_requests
                 WHERE session_id = ?1 ORDER BY id DESC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![session_id], row_to_request);
            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve a handoff request.
pub async fn set_request_status(
    db: &Database,
    id: i64,
    status: HandoffRequestStatus,
) -> Result<(), FrontdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE handoff_requests SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record the operator-channel message carrying this request's buttons.
pub async fn set_operator_message_id(
    db: &Database,
    id: i64,
    message_id: i64,
) -> Result<(), FrontdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE handoff_requests SET operator_message_id = ?1 WHERE id = ?2",
                params![message_id, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
