// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator review of appointment requests (Approve/Decline buttons).

use frontdesk_core::{AppointmentStatus, Business, FrontdeskError, OperatorApi};
use frontdesk_storage::queries::appointments;
use frontdesk_storage::Database;
use tracing::{info, warn};

/// Apply an approve/decline button press to an appointment.
///
/// Replays resolve to a fresh acknowledgement without another status
/// write or message edit.
pub async fn apply_decision(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    appointment_id: i64,
    approve: bool,
    callback_id: &str,
) -> Result<(), FrontdeskError> {
    let Some(appointment) = appointments::get_appointment(db, appointment_id).await? else {
        answer(operator, business, callback_id, "Unknown appointment").await;
        return Ok(());
    };

    let target = if approve {
        AppointmentStatus::Approved
    } else {
        AppointmentStatus::Declined
    };
    let status_text = if approve {
        "\u{2705} Approved"
    } else {
        "\u{274c} Declined"
    };

    if appointment.status == target {
        answer(operator, business, callback_id, &format!("Appointment {status_text}")).await;
        return Ok(());
    }

    appointments::set_appointment_status(db, appointment_id, target).await?;
    info!(appointment_id, status = %target, "appointment reviewed");
    answer(operator, business, callback_id, &format!("Appointment {status_text}")).await;

    // Rewrite the announcement so the buttons disappear and the verdict
    // stays visible in the operator chat.
    if let Some(message_id) = appointment.operator_message_id {
        let text = format!(
            "\u{1f4c5} <b>Appointment #{appointment_id} \u{2014} {status_text}</b>\n\n\
             \u{1f464} <b>Name:</b> {}\n\
             \u{1f4e7} <b>Email:</b> {}\n\
             \u{1f4f1} <b>Mobile:</b> {}\n\
             \u{1f550} <b>Time:</b> {}",
            appointment.customer_name,
            appointment.customer_email,
            appointment.customer_mobile,
            appointment.preferred_time,
        );
        if let Err(e) = operator
            .edit_message(&business.bot_token, &business.operator_chat_id, message_id, &text)
            .await
        {
            warn!(appointment_id, error = %e, "failed to edit appointment announcement");
        }
    }
    Ok(())
}

async fn answer(operator: &dyn OperatorApi, business: &Business, callback_id: &str, text: &str) {
    if let Err(e) = operator
        .answer_callback(&business.bot_token, callback_id, text)
        .await
    {
        warn!(error = %e, "failed to answer callback");
    }
}
