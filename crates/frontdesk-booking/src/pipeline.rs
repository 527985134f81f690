// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The booking pipeline: format check, booking-window check, conflict
//! check, then commit and operator notification.
//!
//! Rejections never abort the turn; they produce a corrective notice that
//! the router appends to the user-visible reply so the customer can fix
//! their request in the next message.

use frontdesk_core::{
    Appointment, AppointmentStatus, Business, FrontdeskError, InlineButton, InlineKeyboard,
    OperatorApi,
};
use frontdesk_storage::queries::appointments;
use frontdesk_storage::Database;
use tracing::{info, warn};

use crate::formats::parse_strict_date;
use crate::hours::check_booking_hours;
use crate::tag::AppointmentDetails;

/// What became of one confirmation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// Stored as pending and (best-effort) announced to the operator.
    Booked { appointment_id: i64 },
    /// Not stored; the notice tells the customer what to change.
    Rejected { notice: String },
}

/// Corrective notice for a confirmation block that never parsed.
pub fn malformed_block_notice() -> String {
    "\u{26a0}\u{fe0f} **I couldn't read those booking details.**\n\
     Please confirm your name, email, mobile, and a time like `12 Feb 2026, 4:00 PM` \
     and I'll try again."
        .to_string()
}

/// Validate one extracted confirmation block and, if it passes, store the
/// appointment and notify the operator.
pub async fn process_confirmation(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    chat_key: &str,
    details: &AppointmentDetails,
) -> Result<BookingOutcome, FrontdeskError> {
    let slot = details.preferred_time.as_str();

    // 1. Strict format check.
    let Some(requested) = parse_strict_date(slot) else {
        info!(business_id = %business.business_id, slot, "appointment rejected: bad time format");
        return Ok(BookingOutcome::Rejected {
            notice: format!(
                "\u{26a0}\u{fe0f} **I need the date in a specific format!**\n\
                 Please provide it like: `12 Feb 2026, 4:00 PM`. \
                 I can't book with vague times like '{slot}'."
            ),
        });
    };

    // 2. Booking window.
    if let Some(reason) = check_booking_hours(requested, &business.appointment_hours) {
        info!(business_id = %business.business_id, slot, "appointment rejected: outside booking hours");
        return Ok(BookingOutcome::Rejected {
            notice: format!(
                "\u{26a0}\u{fe0f} **That time is outside our booking hours.**\n\
                 {reason} Please choose another slot!"
            ),
        });
    }

    // 3. Exact-slot conflict against pending and approved requests.
    if let Some(existing) =
        appointments::find_conflicting(db, &business.business_id, slot).await?
    {
        info!(
            business_id = %business.business_id,
            slot,
            holder = existing.id,
            "appointment rejected: slot already held"
        );
        return Ok(BookingOutcome::Rejected {
            notice: format!(
                "\u{26a0}\u{fe0f} **Sorry, the slot for {slot} is already booked!**\n\
                 Please choose a different date or time and I'll book it for you."
            ),
        });
    }

    // 4. Commit.
    let now = frontdesk_storage::now_timestamp();
    let appointment = Appointment {
        id: 0,
        business_id: business.business_id.clone(),
        chat_key: chat_key.to_string(),
        customer_name: details.customer_name.clone(),
        customer_email: details.customer_email.clone(),
        customer_mobile: details.customer_mobile.clone(),
        preferred_time: slot.to_string(),
        note: details.note.clone(),
        status: AppointmentStatus::Pending,
        operator_message_id: None,
        created_at: now.clone(),
        updated_at: now,
    };
    let appointment_id = appointments::insert_appointment(db, &appointment).await?;
    info!(business_id = %business.business_id, appointment_id, slot, "appointment stored");

    notify_operator(db, operator, business, appointment_id, details).await;

    Ok(BookingOutcome::Booked { appointment_id })
}

/// Announce a new request on the operator channel with Approve/Decline
/// buttons. Best effort: the booking stands even if the channel is down.
async fn notify_operator(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    appointment_id: i64,
    details: &AppointmentDetails,
) {
    if business.bot_token.is_empty() || business.operator_chat_id.is_empty() {
        return;
    }

    let mut text = format!(
        "\u{1f4c5} <b>New Appointment Request!</b>\n\n\
         \u{1f464} <b>Name:</b> {}\n\
         \u{1f4e7} <b>Email:</b> {}\n\
         \u{1f4f1} <b>Mobile:</b> {}\n\
         \u{1f550} <b>Time:</b> {}\n",
        details.customer_name, details.customer_email, details.customer_mobile,
        details.preferred_time,
    );
    if !details.note.is_empty() && details.note != "None" {
        text.push_str(&format!("\u{1f4ac} <b>Note:</b> {}\n", details.note));
    }
    text.push_str(&format!(
        "\n\u{1f3e2} <b>Business:</b> {}\n\u{1f511} <b>Appointment ID:</b> <code>{appointment_id}</code>",
        business.name,
    ));

    let keyboard = InlineKeyboard::single_row(vec![
        InlineButton::callback("\u{2705} Approve", format!("apt_approve_{appointment_id}")),
        InlineButton::callback("\u{274c} Decline", format!("apt_decline_{appointment_id}")),
    ]);

    match operator
        .send_message(&business.bot_token, &business.operator_chat_id, &text, Some(keyboard))
        .await
    {
        Ok(message_id) => {
            if let Err(e) =
                appointments::set_operator_message_id(db, appointment_id, message_id).await
            {
                warn!(appointment_id, error = %e, "failed to record operator message id");
            }
        }
        Err(e) => {
            warn!(appointment_id, error = %e, "failed to notify operator of new appointment");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_storage::queries::businesses;
    use frontdesk_test_utils::{seeded_db, MockOperator};

    fn details(slot: &str) -> AppointmentDetails {
        AppointmentDetails {
            customer_name: "Jo Patel".into(),
            customer_email: "jo@example.com".into(),
            customer_mobile: "+1 555 0100".into(),
            preferred_time: slot.into(),
            note: "first visit".into(),
        }
    }

    #[tokio::test]
    async fn valid_slot_is_booked_and_announced() {
        let (db, _dir, _sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let business = businesses::get_business(&db, "biz-1").await.unwrap().unwrap();

        let outcome = process_confirmation(
            &db,
            &operator,
            &business,
            "chat-a",
            &details("12 Feb 2026, 4:00 PM"),
        )
        .await
        .unwrap();

        let BookingOutcome::Booked { appointment_id } = outcome else {
            panic!("expected Booked, got {outcome:?}");
        };

        let stored = appointments::get_appointment(&db, appointment_id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Pending);
        assert_eq!(stored.preferred_time, "12 Feb 2026, 4:00 PM");

        let sent = operator.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Jo Patel"));
        let keyboard = sent[0].keyboard.as_ref().unwrap();
        let tokens: Vec<&str> = keyboard.inline_keyboard[0]
            .iter()
            .filter_map(|b| b.callback_data.as_deref())
            .collect();
        assert_eq!(
            tokens,
            vec![
                format!("apt_approve_{appointment_id}").as_str(),
                format!("apt_decline_{appointment_id}").as_str(),
            ]
        );
        // The announcement message id is kept for later edits.
        assert_eq!(stored.operator_message_id, Some(sent[0].message_id));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn vague_time_is_rejected_without_storing() {
        let (db, _dir, _sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let business = businesses::get_business(&db, "biz-1").await.unwrap().unwrap();

        let outcome =
            process_confirmation(&db, &operator, &business, "chat-a", &details("tomorrow at 4"))
                .await
                .unwrap();

        let BookingOutcome::Rejected { notice } = outcome else {
            panic!("expected Rejected");
        };
        assert!(notice.contains("specific format"), "got: {notice}");
        assert!(operator.sent_messages().is_empty());
        assert!(appointments::booked_slots(&db, "biz-1").await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn slot_outside_booking_window_is_rejected() {
        let (db, _dir, _sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let business = businesses::get_business(&db, "biz-1").await.unwrap().unwrap();

        // 15 Feb 2026 is a Sunday; the window is Mon-Sat.
        let outcome = process_confirmation(
            &db,
            &operator,
            &business,
            "chat-a",
            &details("15 Feb 2026, 4:00 PM"),
        )
        .await
        .unwrap();

        let BookingOutcome::Rejected { notice } = outcome else {
            panic!("expected Rejected");
        };
        assert!(notice.contains("outside our booking hours"), "got: {notice}");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn exact_slot_conflict_is_rejected() {
        let (db, _dir, _sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let business = businesses::get_business(&db, "biz-1").await.unwrap().unwrap();
        let slot = "12 Feb 2026, 4:00 PM";

        let first = process_confirmation(&db, &operator, &business, "chat-a", &details(slot))
            .await
            .unwrap();
        assert!(matches!(first, BookingOutcome::Booked { .. }));

        let second = process_confirmation(&db, &operator, &business, "other-chat", &details(slot))
            .await
            .unwrap();
        let BookingOutcome::Rejected { notice } = second else {
            panic!("expected Rejected");
        };
        assert!(notice.contains("already booked"), "got: {notice}");
        assert_eq!(appointments::booked_slots(&db, "biz-1").await.unwrap().len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn booking_survives_operator_channel_failure() {
        let (db, _dir, _sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        operator.fail_sends(true);
        let business = businesses::get_business(&db, "biz-1").await.unwrap().unwrap();

        let outcome = process_confirmation(
            &db,
            &operator,
            &business,
            "chat-a",
            &details("12 Feb 2026, 4:00 PM"),
        )
        .await
        .unwrap();

        let BookingOutcome::Booked { appointment_id } = outcome else {
            panic!("expected Booked");
        };
        let stored = appointments::get_appointment(&db, appointment_id).await.unwrap().unwrap();
        assert!(stored.operator_message_id.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn notification_is_skipped_without_bot_config() {
        let (db, _dir, _sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let mut business = businesses::get_business(&db, "biz-1").await.unwrap().unwrap();
        business.bot_token = String::new();

        let outcome = process_confirmation(
            &db,
            &operator,
            &business,
            "chat-a",
            &details("12 Feb 2026, 4:00 PM"),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, BookingOutcome::Booked { .. }));
        assert!(operator.sent_messages().is_empty());

        db.close().await.unwrap();
    }
}
