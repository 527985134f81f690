// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handoff lifecycle: request, accept, decline, tunnel, end.
//!
//! A session's handoff state only moves along
//! None -> Pending -> Active -> None. Operator actions that arrive late
//! or twice (button replays, stale commands) resolve to acknowledgements
//! without repeating side effects.

use frontdesk_core::{
    Business, FrontdeskError, HandoffRequestStatus, HandoffStatus, InlineButton, InlineKeyboard,
    OperatorApi, Role, Session,
};
use frontdesk_storage::queries::{businesses, handoffs, messages, sessions};
use frontdesk_storage::Database;
use tracing::{info, warn};

/// Notice appended to the user-visible reply when a handoff is triggered.
pub const CONNECTING_NOTICE: &str =
    "Stay connected, we are connecting you with a human agent. Please wait (2 min timer started).";

/// Canned reply while a request is still pending.
pub const STILL_CONNECTING: &str =
    "Still connecting... Please wait while we find a human agent. Stay connected!";

const AGENT_JOINED: &str =
    "\u{2705} **Connection successful!** A real person has joined the chat. How can we help you?";
const AGENT_UNAVAILABLE: &str =
    "I'm sorry, no person is available right now. Please try again later.";
const AGENT_LEFT: &str =
    "\u{1f512} **The human agent has left the chat.** AI mode is back on.";

/// Open a pending handoff request for a session and announce it to the
/// operator with Accept/Decline buttons.
///
/// The request row is created unconditionally; the announcement is best
/// effort so an unreachable operator channel cannot lose the request.
pub async fn open_request(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    session_id: &str,
) -> Result<i64, FrontdeskError> {
    let request_id = handoffs::create_request(db, &business.business_id, session_id).await?;
    sessions::set_handoff_status(db, session_id, HandoffStatus::Pending).await?;
    info!(business_id = %business.business_id, session_id, request_id, "handoff requested");

    if business.bot_token.is_empty() || business.operator_chat_id.is_empty() {
        return Ok(request_id);
    }

    let text = format!(
        "\u{1f91d} <b>Chat Handoff Request!</b>\n\n\
         A user has requested to chat with a real person.\n\n\
         \u{1f3e2} <b>Business:</b> {}\n\
         \u{1f511} <b>Session ID:</b> <code>{session_id}</code>",
        business.name,
    );
    let keyboard = InlineKeyboard::single_row(vec![
        InlineButton::callback("\u{2705} Accept", format!("ho_accept_{request_id}")),
        InlineButton::callback("\u{274c} Decline", format!("ho_decline_{request_id}")),
    ]);

    match operator
        .send_message(&business.bot_token, &business.operator_chat_id, &text, Some(keyboard))
        .await
    {
        Ok(message_id) => {
            handoffs::set_operator_message_id(db, request_id, message_id).await?;
        }
        Err(e) => {
            warn!(request_id, error = %e, "failed to announce handoff request");
        }
    }
    Ok(request_id)
}

/// Operator accepted a handoff request.
pub async fn accept(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    request_id: i64,
    callback_id: &str,
) -> Result<(), FrontdeskError> {
    let Some((request, session)) = load_request_session(db, request_id).await? else {
        answer(operator, business, callback_id, "Unknown request").await;
        return Ok(());
    };

    if session.handoff_status == HandoffStatus::Active {
        // Replayed button press; the tunnel is already up.
        answer(operator, business, callback_id, "Already active").await;
        return Ok(());
    }

    if request.status != HandoffRequestStatus::Pending {
        // Stale button from a request that was already accepted, declined,
        // or ended. Never reopens the tunnel from None.
        answer(operator, business, callback_id, "Already resolved").await;
        return Ok(());
    }

    sessions::set_handoff_status(db, &session.id, HandoffStatus::Active).await?;
    sessions::set_agent_response_pending(db, &session.id, false).await?;
    businesses::set_active_handoff_session(db, &business.business_id, Some(&session.id)).await?;
    handoffs::set_request_status(db, request_id, HandoffRequestStatus::Accepted).await?;
    messages::append_unless_repeat(
        db,
        &messages::new_chat_message(&session.id, Role::Assistant, AGENT_JOINED),
    )
    .await?;
    info!(request_id, session_id = %session.id, "handoff accepted, tunnel active");

    answer(operator, business, callback_id, "Accepted").await;
    notify(
        operator,
        business,
        "\u{1f91d} **Handoff Accepted!** Tunnel active.\nUse `/r {id} {msg}` to reply or `/end {id}` to finish.",
    )
    .await;
    Ok(())
}

/// Operator declined a handoff request.
pub async fn decline(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    request_id: i64,
    callback_id: &str,
) -> Result<(), FrontdeskError> {
    let Some((request, session)) = load_request_session(db, request_id).await? else {
        answer(operator, business, callback_id, "Unknown request").await;
        return Ok(());
    };

    if session.handoff_status == HandoffStatus::None
        && request.status != HandoffRequestStatus::Pending
    {
        // Replayed decline; nothing left to undo.
        answer(operator, business, callback_id, "Already resolved").await;
        return Ok(());
    }

    sessions::set_handoff_status(db, &session.id, HandoffStatus::None).await?;
    handoffs::set_request_status(db, request_id, HandoffRequestStatus::Declined).await?;
    messages::append_unless_repeat(
        db,
        &messages::new_chat_message(&session.id, Role::Assistant, AGENT_UNAVAILABLE),
    )
    .await?;
    info!(request_id, session_id = %session.id, "handoff declined");

    answer(operator, business, callback_id, "Declined").await;
    notify(operator, business, "\u{274c} Handoff Declined.").await;
    Ok(())
}

/// Close an active tunnel (button or `/end` command; `callback_id` is
/// `None` on the command path).
pub async fn end(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    request_id: i64,
    callback_id: Option<&str>,
) -> Result<(), FrontdeskError> {
    let Some((_request, session)) = load_request_session(db, request_id).await? else {
        if let Some(callback_id) = callback_id {
            answer(operator, business, callback_id, "Unknown request").await;
        }
        return Ok(());
    };

    sessions::set_handoff_status(db, &session.id, HandoffStatus::None).await?;
    messages::append_unless_repeat(
        db,
        &messages::new_chat_message(&session.id, Role::Assistant, AGENT_LEFT),
    )
    .await?;
    if business.active_handoff_session.as_deref() == Some(session.id.as_str()) {
        businesses::set_active_handoff_session(db, &business.business_id, None).await?;
    }
    info!(request_id, session_id = %session.id, "handoff ended");

    if let Some(callback_id) = callback_id {
        answer(operator, business, callback_id, "Chat ended").await;
    }
    notify(operator, business, &format!("\u{1f512} Chat #{request_id} ended.")).await;
    Ok(())
}

/// `/r <id> <text>`: deliver an operator reply into one session and point
/// untargeted replies at it.
pub async fn targeted_reply(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    request_id: i64,
    text: &str,
    operator_message_id: i64,
) -> Result<(), FrontdeskError> {
    let Some((_request, session)) = load_request_session(db, request_id).await? else {
        return Ok(());
    };

    let written = messages::append_unless_repeat(
        db,
        &messages::new_chat_message(&session.id, Role::Assistant, text),
    )
    .await?;
    if written {
        sessions::set_agent_response_pending(db, &session.id, false).await?;
        businesses::set_active_handoff_session(db, &business.business_id, Some(&session.id)).await?;
        if let Err(e) = operator
            .send_reply(
                &business.bot_token,
                &business.operator_chat_id,
                &format!("\u{1f4e9} Reply sent to #{request_id}"),
                operator_message_id,
            )
            .await
        {
            warn!(request_id, error = %e, "failed to confirm targeted reply");
        }
    }
    Ok(())
}

/// Plain operator prose: deliver into the business's active session.
pub async fn tunnel_reply(
    db: &Database,
    business: &Business,
    text: &str,
) -> Result<(), FrontdeskError> {
    let Some(session_id) = business.active_handoff_session.as_deref() else {
        return Ok(());
    };
    let written = messages::append_unless_repeat(
        db,
        &messages::new_chat_message(session_id, Role::Assistant, text),
    )
    .await?;
    if written {
        sessions::set_agent_response_pending(db, session_id, false).await?;
    }
    Ok(())
}

/// Forward a user message through an active tunnel to the operator, with
/// Reply/End affordances, and flag the session as awaiting a reply.
pub async fn forward_tunneled_message(
    db: &Database,
    operator: &dyn OperatorApi,
    business: &Business,
    session: &Session,
    user_message: &str,
) -> Result<(), FrontdeskError> {
    let request_id = handoffs::pending_request_for_session(db, &session.id)
        .await?
        .map(|r| r.id);
    let request_id = match request_id {
        Some(id) => id,
        // Accepted requests are resolved; fall back to the latest one.
        None => latest_request_id(db, &session.id).await?.unwrap_or(0),
    };

    let keyboard = InlineKeyboard::single_row(vec![
        InlineButton::inline_query("\u{1f4ac} Reply", format!("/r {request_id} ")),
        InlineButton::callback("\u{1f512} End", format!("ho_end_{request_id}")),
    ]);
    let text = format!("\u{1f464} <b>User:</b> {user_message}\n\n#id_{request_id}");

    if let Err(e) = operator
        .send_message(&business.bot_token, &business.operator_chat_id, &text, Some(keyboard))
        .await
    {
        warn!(session_id = %session.id, error = %e, "failed to forward tunneled message");
    }

    messages::append_message(db, &messages::new_chat_message(&session.id, Role::User, user_message))
        .await?;
    sessions::set_agent_response_pending(db, &session.id, true).await?;
    Ok(())
}

async fn latest_request_id(db: &Database, session_id: &str) -> Result<Option<i64>, FrontdeskError> {
    // The newest request for the session regardless of status.
    let pending = handoffs::pending_request_for_session(db, session_id).await?;
    if let Some(request) = pending {
        return Ok(Some(request.id));
    }
    handoffs::latest_request_for_session(db, session_id)
        .await
        .map(|r| r.map(|r| r.id))
}

async fn load_request_session(
    db: &Database,
    request_id: i64,
) -> Result<Option<(frontdesk_core::HandoffRequest, Session)>, FrontdeskError> {
    let Some(request) = handoffs::get_request(db, request_id).await? else {
        return Ok(None);
    };
    let Some(session) = sessions::get_session(db, &request.session_id).await? else {
        return Ok(None);
    };
    Ok(Some((request, session)))
}

async fn answer(operator: &dyn OperatorApi, business: &Business, callback_id: &str, text: &str) {
    if let Err(e) = operator
        .answer_callback(&business.bot_token, callback_id, text)
        .await
    {
        warn!(error = %e, "failed to answer callback");
    }
}

async fn notify(operator: &dyn OperatorApi, business: &Business, text: &str) {
    if let Err(e) = operator
        .send_message(&business.bot_token, &business.operator_chat_id, text, None)
        .await
    {
        warn!(error = %e, "failed to notify operator");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::Role;
    use frontdesk_storage::queries::messages::session_log;
    use frontdesk_test_utils::{seeded_db, MockOperator};

    async fn business(db: &Database) -> Business {
        businesses::get_business(db, "biz-1").await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn open_request_moves_session_to_pending_and_announces() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;

        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::Pending);

        let sent = operator.sent_messages();
        assert_eq!(sent.len(), 1);
        let buttons: Vec<&str> = sent[0].keyboard.as_ref().unwrap().inline_keyboard[0]
            .iter()
            .filter_map(|b| b.callback_data.as_deref())
            .collect();
        assert_eq!(
            buttons,
            vec![
                format!("ho_accept_{request_id}").as_str(),
                format!("ho_decline_{request_id}").as_str(),
            ]
        );

        let request = handoffs::get_request(&db, request_id).await.unwrap().unwrap();
        assert_eq!(request.operator_message_id, Some(sent[0].message_id));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn accept_activates_tunnel_and_tells_both_sides() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();

        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::Active);

        let biz = business(&db).await;
        assert_eq!(biz.active_handoff_session.as_deref(), Some(sid.as_str()));

        let request = handoffs::get_request(&db, request_id).await.unwrap().unwrap();
        assert_eq!(request.status, HandoffRequestStatus::Accepted);

        // User sees the joined notice in their log.
        let log = session_log(&db, &sid).await.unwrap();
        assert!(log.iter().any(|m| m.role == Role::Assistant && m.content.contains("real person has joined")));

        assert_eq!(operator.answered_callbacks(), vec![("cb-1".to_string(), "Accepted".to_string())]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn accept_replay_answers_already_active_without_side_effects() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();

        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();
        let log_before = session_log(&db, &sid).await.unwrap().len();

        accept(&db, &operator, &biz, request_id, "cb-2").await.unwrap();

        assert_eq!(session_log(&db, &sid).await.unwrap().len(), log_before);
        let answers = operator.answered_callbacks();
        assert_eq!(answers.last().unwrap().1, "Already active");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_accept_after_end_does_not_reopen_the_tunnel() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();
        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();
        let biz = business(&db).await;
        end(&db, &operator, &biz, request_id, None).await.unwrap();
        let biz = business(&db).await;
        let log_before = session_log(&db, &sid).await.unwrap().len();

        // The old Accept button can still be tapped after the chat ended.
        accept(&db, &operator, &biz, request_id, "cb-2").await.unwrap();

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::None);
        let biz = business(&db).await;
        assert!(biz.active_handoff_session.is_none());
        assert_eq!(session_log(&db, &sid).await.unwrap().len(), log_before);
        assert_eq!(operator.answered_callbacks().last().unwrap().1, "Already resolved");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_accept_after_decline_stays_declined() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();
        decline(&db, &operator, &biz, request_id, "cb-1").await.unwrap();

        accept(&db, &operator, &biz, request_id, "cb-2").await.unwrap();

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::None);
        let request = handoffs::get_request(&db, request_id).await.unwrap().unwrap();
        assert_eq!(request.status, HandoffRequestStatus::Declined);
        assert_eq!(operator.answered_callbacks().last().unwrap().1, "Already resolved");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn decline_returns_session_to_none_with_apology() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();

        decline(&db, &operator, &biz, request_id, "cb-1").await.unwrap();

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::None);
        let request = handoffs::get_request(&db, request_id).await.unwrap().unwrap();
        assert_eq!(request.status, HandoffRequestStatus::Declined);

        let log = session_log(&db, &sid).await.unwrap();
        assert!(log.iter().any(|m| m.content.contains("no person is available")));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn end_closes_tunnel_and_clears_pointer() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();
        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();
        let biz = business(&db).await;

        end(&db, &operator, &biz, request_id, Some("cb-2")).await.unwrap();

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::None);
        let biz = business(&db).await;
        assert!(biz.active_handoff_session.is_none());

        let log = session_log(&db, &sid).await.unwrap();
        assert!(log.iter().any(|m| m.content.contains("human agent has left")));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_cycle_can_repeat() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;

        let first = open_request(&db, &operator, &biz, &sid).await.unwrap();
        accept(&db, &operator, &biz, first, "cb-1").await.unwrap();
        let biz = business(&db).await;
        end(&db, &operator, &biz, first, None).await.unwrap();

        // A second cycle starts cleanly from None.
        let second = open_request(&db, &operator, &biz, &sid).await.unwrap();
        assert!(second > first);
        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::Pending);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn targeted_reply_lands_in_the_session_and_confirms() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();
        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();
        sessions::set_agent_response_pending(&db, &sid, true).await.unwrap();
        let biz = business(&db).await;

        targeted_reply(&db, &operator, &biz, request_id, "be right with you", 42)
            .await
            .unwrap();

        let log = session_log(&db, &sid).await.unwrap();
        assert_eq!(log.last().unwrap().content, "be right with you");
        assert_eq!(log.last().unwrap().role, Role::Assistant);

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert!(!session.agent_response_pending);

        let replies = operator.sent_replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].reply_to_message_id, 42);
        assert!(replies[0].text.contains(&format!("#{request_id}")));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_targeted_reply_is_dropped() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();
        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();
        let biz = business(&db).await;

        targeted_reply(&db, &operator, &biz, request_id, "hello", 42).await.unwrap();
        targeted_reply(&db, &operator, &biz, request_id, "hello", 43).await.unwrap();

        let log = session_log(&db, &sid).await.unwrap();
        let hellos = log.iter().filter(|m| m.content == "hello").count();
        assert_eq!(hellos, 1);
        // No confirmation for the dropped duplicate.
        assert_eq!(operator.sent_replies().len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn tunnel_reply_without_active_session_is_a_noop() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let biz = business(&db).await;

        tunnel_reply(&db, &biz, "anyone there?").await.unwrap();

        assert!(session_log(&db, &sid).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn forward_tunneled_message_carries_reply_and_end_buttons() {
        let (db, _dir, sid) = seeded_db("biz-1", "chat-a").await;
        let operator = MockOperator::new();
        let biz = business(&db).await;
        let request_id = open_request(&db, &operator, &biz, &sid).await.unwrap();
        accept(&db, &operator, &biz, request_id, "cb-1").await.unwrap();
        let biz = business(&db).await;
        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();

        forward_tunneled_message(&db, &operator, &biz, &session, "is my order ready?")
            .await
            .unwrap();

        let sent = operator.sent_messages();
        let forwarded = sent.last().unwrap();
        assert!(forwarded.text.contains("is my order ready?"));
        assert!(forwarded.text.contains(&format!("#id_{request_id}")));
        let row = &forwarded.keyboard.as_ref().unwrap().inline_keyboard[0];
        assert_eq!(
            row[0].switch_inline_query_current_chat.as_deref(),
            Some(format!("/r {request_id} ").as_str())
        );
        assert_eq!(row[1].callback_data.as_deref(), Some(format!("ho_end_{request_id}").as_str()));

        let session = sessions::get_session(&db, &sid).await.unwrap().unwrap();
        assert!(session.agent_response_pending);
        let log = session_log(&db, &sid).await.unwrap();
        assert_eq!(log.last().unwrap().role, Role::User);

        db.close().await.unwrap();
    }
}
