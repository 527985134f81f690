// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One user turn end to end: session lookup, handoff interception,
//! context assembly, the gateway call, and tag handling on the output.

use std::sync::Arc;
use std::sync::LazyLock;

use frontdesk_bridge::handoff;
use frontdesk_bridge::{CONNECTING_NOTICE, STILL_CONNECTING};
use frontdesk_booking::pipeline::{self, BookingOutcome};
use frontdesk_booking::tag::{self, TagScan};
use frontdesk_core::{
    Business, FrontdeskError, HandoffStatus, OperatorApi, PromptMessage, Role, Session, SessionId,
};
use frontdesk_gateway::Gateway;
use frontdesk_storage::queries::{appointments, businesses, messages, sessions};
use frontdesk_storage::Database;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::prompt;

// Catches the marker and its recognizable truncations.
static HANDOFF_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[REQUEST_HUMAN(_HANDOFF)?\]?").unwrap());

static NEWLINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// How many trailing user/assistant entries go to the model, on top of
/// the uncounted leading system message.
const CONTEXT_WINDOW: usize = 10;

/// The result of one routed user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A model (or pipeline-corrected) reply for the user.
    Reply {
        chat_key: String,
        text: String,
        appointment_booked: bool,
        handoff_requested: bool,
    },
    /// A handoff request is still awaiting the operator.
    HandoffPending { chat_key: String, text: String },
    /// The message was tunneled to the operator; no reply until a human
    /// answers.
    HandoffActive { chat_key: String },
}

/// Routes user turns for every business served by this process.
pub struct SessionRouter {
    db: Arc<Database>,
    gateway: Gateway,
    operator: Arc<dyn OperatorApi>,
}

impl SessionRouter {
    pub fn new(db: Arc<Database>, gateway: Gateway, operator: Arc<dyn OperatorApi>) -> Self {
        Self {
            db,
            gateway,
            operator,
        }
    }

    /// Handle one user message. A missing `chat_key` starts a fresh
    /// session under a generated key, returned in the outcome.
    pub async fn handle_turn(
        &self,
        business_id: &str,
        chat_key: Option<&str>,
        user_message: &str,
    ) -> Result<TurnOutcome, FrontdeskError> {
        let Some(business) = businesses::get_business(&self.db, business_id).await? else {
            return Err(FrontdeskError::NotFound {
                entity: "business",
                id: business_id.to_string(),
            });
        };

        let chat_key = match chat_key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => new_chat_key(),
        };
        let session_id = SessionId::compose(business_id, &chat_key);

        let session = match sessions::get_session(&self.db, session_id.as_str()).await? {
            Some(session) => session,
            None => self.create_session(&business, &chat_key, &session_id).await?,
        };

        match session.handoff_status {
            HandoffStatus::Active => {
                handoff::forward_tunneled_message(
                    &self.db,
                    self.operator.as_ref(),
                    &business,
                    &session,
                    user_message,
                )
                .await?;
                return Ok(TurnOutcome::HandoffActive { chat_key });
            }
            HandoffStatus::Pending => {
                // Logged for the operator's context once they join; no
                // assistant entry so the human transcript stays clean.
                messages::append_message(
                    &self.db,
                    &messages::new_chat_message(session_id.as_str(), Role::User, user_message),
                )
                .await?;
                return Ok(TurnOutcome::HandoffPending {
                    chat_key,
                    text: STILL_CONNECTING.to_string(),
                });
            }
            HandoffStatus::None => {}
        }

        messages::append_message(
            &self.db,
            &messages::new_chat_message(session_id.as_str(), Role::User, user_message),
        )
        .await?;

        let context = self
            .build_context(&business, &chat_key, session_id.as_str(), user_message)
            .await?;
        let raw = self.gateway.generate(&context).await?;

        let scan = tag::scan(&raw);
        let mut visible = tag::strip_block(&raw);
        let mut appointment_booked = false;
        match scan {
            TagScan::Found(details) => {
                match pipeline::process_confirmation(
                    &self.db,
                    self.operator.as_ref(),
                    &business,
                    &chat_key,
                    &details,
                )
                .await?
                {
                    BookingOutcome::Booked { appointment_id } => {
                        info!(session_id = %session_id, appointment_id, "turn booked an appointment");
                        appointment_booked = true;
                    }
                    BookingOutcome::Rejected { notice } => {
                        visible = format!("{visible}\n\n{notice}");
                    }
                }
            }
            TagScan::Malformed => {
                visible = format!("{visible}\n\n{}", pipeline::malformed_block_notice());
            }
            TagScan::Absent => {}
        }

        visible = NEWLINE_RUNS.replace_all(&visible, "\n\n").trim().to_string();
        if visible.contains("[CHECK_STATUS]") {
            visible = visible.replace("[CHECK_STATUS]", "").trim().to_string();
        }

        // The session is None here; Pending and Active turned back above.
        let handoff_requested = raw.contains("[REQUEST_HUMAN");
        if handoff_requested {
            visible = HANDOFF_MARKER.replace_all(&visible, "").trim().to_string();
            visible = if visible.is_empty() {
                CONNECTING_NOTICE.to_string()
            } else {
                format!("{visible}\n\n{CONNECTING_NOTICE}")
            };
        }

        messages::append_unless_repeat(
            &self.db,
            &messages::new_chat_message(session_id.as_str(), Role::Assistant, &visible),
        )
        .await?;

        if handoff_requested {
            handoff::open_request(&self.db, self.operator.as_ref(), &business, session_id.as_str())
                .await?;
        }

        Ok(TurnOutcome::Reply {
            chat_key,
            text: visible,
            appointment_booked,
            handoff_requested,
        })
    }

    async fn create_session(
        &self,
        business: &Business,
        chat_key: &str,
        session_id: &SessionId,
    ) -> Result<Session, FrontdeskError> {
        let now = frontdesk_storage::now_timestamp();
        let session = Session {
            id: session_id.as_str().to_string(),
            business_id: business.business_id.clone(),
            chat_key: chat_key.to_string(),
            handoff_status: HandoffStatus::None,
            agent_response_pending: false,
            created_at: now.clone(),
            updated_at: now,
        };
        sessions::create_session(&self.db, &session).await?;

        let seed = if business.system_prompt.is_empty() {
            prompt::FALLBACK_SYSTEM_PROMPT
        } else {
            business.system_prompt.as_str()
        };
        messages::append_message(
            &self.db,
            &messages::new_chat_message(session_id.as_str(), Role::System, seed),
        )
        .await?;
        info!(business_id = %business.business_id, session_id = %session_id, "session created");

        if !business.bot_token.is_empty() && !business.operator_chat_id.is_empty() {
            let text = format!(
                "\u{1f514} <b>New Chat Started!</b>\n\
                 Business: {}\n\
                 Chat ID: <code>{chat_key}</code>",
                business.name,
            );
            if let Err(e) = self
                .operator
                .send_message(&business.bot_token, &business.operator_chat_id, &text, None)
                .await
            {
                warn!(session_id = %session_id, error = %e, "failed to announce new session");
            }
        }
        Ok(session)
    }

    /// Leading system message (refreshed booking addon) + the last
    /// [`CONTEXT_WINDOW`] log entries + the ephemeral status note when the
    /// user is asking about their appointments.
    async fn build_context(
        &self,
        business: &Business,
        chat_key: &str,
        session_id: &str,
        user_message: &str,
    ) -> Result<Vec<PromptMessage>, FrontdeskError> {
        let booked = if business.appointment_enabled {
            appointments::booked_slots(&self.db, &business.business_id).await?
        } else {
            Vec::new()
        };
        let mut context = vec![PromptMessage::new(
            Role::System,
            prompt::system_context(business, &booked),
        )];

        let log = messages::session_log(&self.db, session_id).await?;
        let turns: Vec<_> = log.iter().filter(|m| m.role != Role::System).collect();
        let start = turns.len().saturating_sub(CONTEXT_WINDOW);
        for entry in &turns[start..] {
            context.push(PromptMessage::new(entry.role, entry.content.clone()));
        }

        if prompt::wants_status_summary(user_message) {
            let records =
                appointments::list_for_chat(&self.db, &business.business_id, chat_key).await?;
            if !records.is_empty() {
                debug!(session_id, count = records.len(), "injecting appointment status note");
                context.push(PromptMessage::new(Role::System, prompt::status_note(&records)));
            }
        }
        Ok(context)
    }
}

fn new_chat_key() -> String {
    let mut key = Uuid::new_v4().simple().to_string();
    key.truncate(16);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::{Appointment, AppointmentStatus};
    use frontdesk_storage::queries::handoffs;
    use frontdesk_test_utils::{seeded_db, MockCompletion, MockOperator};

    struct Harness {
        router: SessionRouter,
        completion: Arc<MockCompletion>,
        operator: Arc<MockOperator>,
        db: Arc<Database>,
        _dir: tempfile::TempDir,
        session_id: String,
    }

    async fn harness() -> Harness {
        let (db, dir, session_id) = seeded_db("biz-1", "chat-a").await;
        let db = Arc::new(db);
        let completion = Arc::new(MockCompletion::new());
        let operator = Arc::new(MockOperator::new());
        let gateway = Gateway::new(completion.clone(), vec!["model-a".into()]);
        let router = SessionRouter::new(db.clone(), gateway, operator.clone());
        Harness {
            router,
            completion,
            operator,
            db,
            _dir: dir,
            session_id,
        }
    }

    #[tokio::test]
    async fn first_turn_creates_session_and_notifies_operator() {
        let h = harness().await;
        h.completion.queue_reply("Welcome! How can I help?");

        let outcome = h.router.handle_turn("biz-1", None, "hi").await.unwrap();

        let TurnOutcome::Reply { chat_key, text, .. } = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(chat_key.len(), 16);
        assert_eq!(text, "Welcome! How can I help?");

        let sent = h.operator.sent_messages();
        assert!(sent[0].text.contains("New Chat Started!"));
        assert!(sent[0].text.contains(&chat_key));

        let sid = SessionId::compose("biz-1", &chat_key);
        let log = messages::session_log(&h.db, sid.as_str()).await.unwrap();
        let roles: Vec<Role> = log.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn context_leads_with_system_and_keeps_the_window() {
        let h = harness().await;
        for i in 0..8 {
            messages::append_message(
                &h.db,
                &messages::new_chat_message(&h.session_id, Role::User, format!("q{i}")),
            )
            .await
            .unwrap();
            messages::append_message(
                &h.db,
                &messages::new_chat_message(&h.session_id, Role::Assistant, format!("a{i}")),
            )
            .await
            .unwrap();
        }
        h.completion.queue_reply("noted");

        h.router.handle_turn("biz-1", Some("chat-a"), "hello").await.unwrap();

        let calls = h.completion.calls();
        let sent = &calls[0].messages;
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[0].content.contains("APPOINTMENT BOOKING"));
        // Leading system + ten most recent turns.
        assert_eq!(sent.len(), 1 + 10);
        assert_eq!(sent.last().unwrap().content, "hello");

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_question_injects_an_ephemeral_note() {
        let h = harness().await;
        let now = frontdesk_storage::now_timestamp();
        appointments::insert_appointment(
            &h.db,
            &Appointment {
                id: 0,
                business_id: "biz-1".into(),
                chat_key: "chat-a".into(),
                customer_name: "Jo".into(),
                customer_email: "jo@example.com".into(),
                customer_mobile: "+1 555 0100".into(),
                preferred_time: "12 Feb 2026, 4:00 PM".into(),
                note: String::new(),
                status: AppointmentStatus::Approved,
                operator_message_id: None,
                created_at: now.clone(),
                updated_at: now,
            },
        )
        .await
        .unwrap();
        h.completion.queue_reply("Your appointment is confirmed!");

        h.router
            .handle_turn("biz-1", Some("chat-a"), "what's my appointment status?")
            .await
            .unwrap();

        let calls = h.completion.calls();
        let note = calls[0].messages.last().unwrap();
        assert_eq!(note.role, Role::System);
        assert!(note.content.contains("CURRENT APPOINTMENT STATUS"));
        assert!(note.content.contains("APPROVED"));

        // The note is ephemeral.
        let log = messages::session_log(&h.db, &h.session_id).await.unwrap();
        assert!(!log.iter().any(|m| m.content.contains("CURRENT APPOINTMENT STATUS")));

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn confirmation_block_books_and_is_stripped() {
        let h = harness().await;
        h.completion.queue_reply(
            "Great, you're all set!\n\n\
             [APPOINTMENT_CONFIRMED]\n\
             Name: Jo Patel\n\
             Email: jo@example.com\n\
             Mobile: +1 555 0100\n\
             Time: 12 Feb 2026, 4:00 PM\n\
             Message: None\n\
             [/APPOINTMENT_CONFIRMED]",
        );

        let outcome = h
            .router
            .handle_turn("biz-1", Some("chat-a"), "book me in please")
            .await
            .unwrap();

        let TurnOutcome::Reply {
            text,
            appointment_booked,
            ..
        } = outcome
        else {
            panic!("expected a reply");
        };
        assert!(appointment_booked);
        assert_eq!(text, "Great, you're all set!");

        let records = appointments::list_for_chat(&h.db, "biz-1", "chat-a").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].preferred_time, "12 Feb 2026, 4:00 PM");

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn conflicting_slot_yields_a_corrective_notice() {
        let h = harness().await;
        let now = frontdesk_storage::now_timestamp();
        appointments::insert_appointment(
            &h.db,
            &Appointment {
                id: 0,
                business_id: "biz-1".into(),
                chat_key: "other-chat".into(),
                customer_name: "Sam".into(),
                customer_email: "sam@example.com".into(),
                customer_mobile: "+1 555 0200".into(),
                preferred_time: "12 Feb 2026, 4:00 PM".into(),
                note: String::new(),
                status: AppointmentStatus::Pending,
                operator_message_id: None,
                created_at: now.clone(),
                updated_at: now,
            },
        )
        .await
        .unwrap();
        h.completion.queue_reply(
            "Booking now.\n\
             [APPOINTMENT_CONFIRMED]\n\
             Name: Jo Patel\n\
             Email: jo@example.com\n\
             Mobile: +1 555 0100\n\
             Time: 12 Feb 2026, 4:00 PM\n\
             Message: None\n\
             [/APPOINTMENT_CONFIRMED]",
        );

        let outcome = h
            .router
            .handle_turn("biz-1", Some("chat-a"), "book 12 Feb 4pm")
            .await
            .unwrap();

        let TurnOutcome::Reply {
            text,
            appointment_booked,
            ..
        } = outcome
        else {
            panic!("expected a reply");
        };
        assert!(!appointment_booked);
        assert!(text.contains("already booked"));
        assert!(!text.contains("[APPOINTMENT_CONFIRMED]"));

        let records = appointments::list_for_chat(&h.db, "biz-1", "chat-a").await.unwrap();
        assert!(records.is_empty());

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn handoff_marker_opens_a_request_and_appends_the_notice() {
        let h = harness().await;
        h.completion
            .queue_reply("I'm connecting you to a human agent now. [REQUEST_HUMAN_HANDOFF]");

        let outcome = h
            .router
            .handle_turn("biz-1", Some("chat-a"), "let me talk to a real person")
            .await
            .unwrap();

        let TurnOutcome::Reply {
            text,
            handoff_requested,
            ..
        } = outcome
        else {
            panic!("expected a reply");
        };
        assert!(handoff_requested);
        assert!(!text.contains("[REQUEST_HUMAN"));
        assert!(text.contains(CONNECTING_NOTICE));

        let session = sessions::get_session(&h.db, &h.session_id).await.unwrap().unwrap();
        assert_eq!(session.handoff_status, HandoffStatus::Pending);
        let request = handoffs::pending_request_for_session(&h.db, &h.session_id)
            .await
            .unwrap();
        assert!(request.is_some());

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn truncated_marker_is_scrubbed_too() {
        let h = harness().await;
        h.completion.queue_reply("Connecting you now. [REQUEST_HUMAN");

        let outcome = h
            .router
            .handle_turn("biz-1", Some("chat-a"), "human please")
            .await
            .unwrap();

        let TurnOutcome::Reply { text, handoff_requested, .. } = outcome else {
            panic!("expected a reply");
        };
        assert!(handoff_requested);
        assert!(!text.contains("[REQUEST_HUMAN"));

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pending_session_answers_with_the_waiting_notice() {
        let h = harness().await;
        sessions::set_handoff_status(&h.db, &h.session_id, HandoffStatus::Pending)
            .await
            .unwrap();

        let outcome = h
            .router
            .handle_turn("biz-1", Some("chat-a"), "anyone there?")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::HandoffPending {
                chat_key: "chat-a".to_string(),
                text: STILL_CONNECTING.to_string(),
            }
        );
        assert_eq!(h.completion.call_count(), 0);

        // The user message is logged; no assistant entry is.
        let log = messages::session_log(&h.db, &h.session_id).await.unwrap();
        assert_eq!(log.last().unwrap().role, Role::User);
        assert_eq!(log.last().unwrap().content, "anyone there?");

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn active_session_tunnels_without_a_gateway_call() {
        let h = harness().await;
        handoffs::create_request(&h.db, "biz-1", &h.session_id).await.unwrap();
        sessions::set_handoff_status(&h.db, &h.session_id, HandoffStatus::Active)
            .await
            .unwrap();

        let outcome = h
            .router
            .handle_turn("biz-1", Some("chat-a"), "is my order ready?")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::HandoffActive {
                chat_key: "chat-a".to_string()
            }
        );
        assert_eq!(h.completion.call_count(), 0);

        let forwarded = h.operator.sent_messages();
        assert!(forwarded.last().unwrap().text.contains("is my order ready?"));

        let session = sessions::get_session(&h.db, &h.session_id).await.unwrap().unwrap();
        assert!(session.agent_response_pending);

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn gateway_exhaustion_leaves_no_assistant_entry() {
        let h = harness().await;
        h.completion.queue_failure("backend down");

        let result = h.router.handle_turn("biz-1", Some("chat-a"), "hello").await;
        assert!(matches!(result, Err(FrontdeskError::Gateway { .. })));

        let log = messages::session_log(&h.db, &h.session_id).await.unwrap();
        assert_eq!(log.last().unwrap().role, Role::User);

        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_business_is_a_not_found_error() {
        let h = harness().await;
        let result = h.router.handle_turn("nope", Some("chat-a"), "hi").await;
        assert!(matches!(result, Err(FrontdeskError::NotFound { .. })));
        h.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn triple_newlines_collapse_in_the_visible_reply() {
        let h = harness().await;
        h.completion.queue_reply("Line one.\n\n\n\nLine two. [CHECK_STATUS]");

        let outcome = h.router.handle_turn("biz-1", Some("chat-a"), "hi").await.unwrap();
        let TurnOutcome::Reply { text, .. } = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(text, "Line one.\n\nLine two.");

        h.db.close().await.unwrap();
    }
}
