// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment request persistence and slot-conflict lookups.

use frontdesk_core::{Appointment, AppointmentStatus, FrontdeskError};
use rusqlite::params;

use crate::database::Database;
use crate::queries::column_enum;

const COLUMNS: &str = "id, business_id, chat_key, customer_name, customer_email, \
     customer_mobile, preferred_time, note, status, operator_message_id, \
     created_at, updated_at";

fn row_to_appointment(row: &rusqlite::Row<'_>) -> Result<Appointment, rusqlite::Error> {
    Ok(Appointment {
        id: row.get(0)?,
        business_id: row.get(1)?,
        chat_key: row.get(2)?,
        customer_name: row.get(3)?,
        customer_email: row.get(4)?,
        customer_mobile: row.get(5)?,
        preferred_time: row.get(6)?,
        note: row.get(7)?,
        status: column_enum(8, row.get::<_, String>(8)?)?,
        operator_message_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert a new appointment request; returns the assigned row id.
///
/// The `id` field of the passed value is ignored.
pub async fn insert_appointment(
    db: &Database,
    appointment: &Appointment,
) -> Result<i64, FrontdeskError> {
    let appointment = appointment.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO appointments (business_id, chat_key, customer_name, customer_email,
                     customer_mobile, preferred_time, note, status, operator_message_id,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    appointment.business_id,
                    appointment.chat_key,
                    appointment.customer_name,
                    appointment.customer_email,
                    appointment.customer_mobile,
                    appointment.preferred_time,
                    appointment.note,
                    appointment.status.to_string(),
                    appointment.operator_message_id,
                    appointment.created_at,
                    appointment.updated_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an appointment by row id.
pub async fn get_appointment(db: &Database, id: i64) -> Result<Option<Appointment>, FrontdeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_appointment);
            match result {
                Ok(appointment) => Ok(Some(appointment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move an appointment to a new review state and touch updated_at.
pub async fn set_appointment_status(
    db: &Database,
    id: i64,
    status: AppointmentStatus,
) -> Result<(), FrontdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE appointments
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record the operator-channel message carrying this appointment's buttons.
pub async fn set_operator_message_id(
    db: &Database,
    id: i64,
    message_id: i64,
) -> Result<(), FrontdeskError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE appointments SET operator_message_id = ?1 WHERE id = ?2",
                params![message_id, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find a pending or approved appointment already holding this exact slot.
pub async fn find_conflicting(
    db: &Database,
    business_id: &str,
    preferred_time: &str,
) -> Result<Option<Appointment>, FrontdeskError> {
    let business_id = business_id.to_string();
    let preferred_time = preferred_time.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM appointments
                 WHERE business_id = ?1 AND preferred_time = ?2
                   AND status IN ('pending', 'approved')
                 LIMIT 1"
            ))?;
            let result = stmt.query_row(params![business_id, preferred_time], row_to_appointment);
            match result {
                Ok(appointment) => Ok(Some(appointment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Slots currently held (pending or approved) for a business, for prompting.
pub async fn booked_slots(db: &Database, business_id: &str) -> Result<Vec<String>, FrontdeskError> {
    let business_id = business_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT preferred_time FROM appointments
                 WHERE business_id = ?1 AND status IN ('pending', 'approved')
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![business_id], |row| row.get(0))?;
            let mut slots = Vec::new();
            for row in rows {
                slots.push(row?);
            }
            Ok(slots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A customer's appointment requests, newest first.
pub async fn list_for_chat(
    db: &Database,
    business_id: &str,
    chat_key: &str,
) -> Result<Vec<Appointment>, FrontdeskError> {
    let business_id = business_id.to_string();
    let chat_key = chat_key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM appointments
                 WHERE business_id = ?1 AND chat_key = ?2 ORDER BY id DESC"
            ))?;
            let rows = stmt.query_map(params![business_id, chat_key], row_to_appointment)?;
            let mut appointments = Vec::new();
            for row in rows {
                appointments.push(row?);
            }
            Ok(appointments)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
