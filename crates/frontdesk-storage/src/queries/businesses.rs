// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business profile CRUD plus the two mutable bridge fields.

use frontdesk_core::{Business, FrontdeskError};
use rusqlite::params;

use crate::database::Database;

const COLUMNS: &str = "business_id, name, system_prompt, business_hours, appointment_hours, \
     appointment_enabled, bot_token, operator_chat_id, active_handoff_session, \
     update_offset, created_at";

fn row_to_business(row: &rusqlite::Row<'_>) -> Result<Business, rusqlite::Error> {
    Ok(Business {
        business_id: row.get(0)?,
        name: row.get(1)?,
        system_prompt: row.get(2)?,
        business_hours: row.get(3)?,
        appointment_hours: row.get(4)?,
        appointment_enabled: row.get(5)?,
        bot_token: row.get(6)?,
        operator_chat_id: row.get(7)?,
        active_handoff_session: row.get(8)?,
        update_offset: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Register a new business profile.
pub async fn create_business(db: &Database, business: &Business) -> Result<(), FrontdeskError> {
    let business = business.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO businesses (business_id, name, system_prompt, business_hours,
                     appointment_hours, appointment_enabled, bot_token, operator_chat_id,
                     active_handoff_session, update_offset, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    business.business_id,
                    business.name,
                    business.system_prompt,
                    business.business_hours,
                    business.appointment_hours,
                    business.appointment_enabled,
                    business.bot_token,
                    business.operator_chat_id,
                    business.active_handoff_session,
                    business.update_offset,
                    business.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a business by ID.
pub async fn get_business(db: &Database, id: &str) -> Result<Option<Business>, FrontdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM businesses WHERE business_id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_business);
            match result {
                Ok(business) => Ok(Some(business)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List businesses with an operator bot configured, for the update poller.
pub async fn list_bridged_businesses(db: &Database) -> Result<Vec<Business>, FrontdeskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM businesses WHERE bot_token != '' ORDER BY business_id"
            ))?;
            let rows = stmt.query_map([], row_to_business)?;
            let mut businesses = Vec::new();
            for row in rows {
                businesses.push(row?);
            }
            Ok(businesses)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Point untargeted operator replies at a session, or clear the pointer.
pub async fn set_active_handoff_session(
    db: &Database,
    business_id: &str,
    session_id: Option<&str>,
) -> Result<(), FrontdeskError> {
    let business_id = business_id.to_string();
    let session_id = session_id.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE businesses SET active_handoff_session = ?1 WHERE business_id = ?2",
                params![session_id, business_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Advance the getUpdates poll cursor for a business.
pub async fn set_update_offset(
    db: &Database,
    business_id: &str,
    offset: i64,
) -> Result<(), FrontdeskError> {
    let business_id = business_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE businesses SET update_offset = ?1 WHERE business_id = ?2",
                params![offset, business_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
