// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database fixtures: a temporary database seeded with one business and
//! one session.

use frontdesk_core::{Business, HandoffStatus, Session, SessionId};
use frontdesk_storage::queries::{businesses, sessions};
use frontdesk_storage::{now_timestamp, Database};

/// A business profile with the operator bridge and booking enabled.
pub fn test_business(business_id: &str) -> Business {
    Business {
        business_id: business_id.to_string(),
        name: "Acme Dental".to_string(),
        system_prompt: "You are the assistant for Acme Dental.".to_string(),
        business_hours: "Mon-Fri 9:00 AM - 5:00 PM".to_string(),
        appointment_hours: "Mon-Sat 9:00 AM - 5:00 PM".to_string(),
        appointment_enabled: true,
        bot_token: "123:test-token".to_string(),
        operator_chat_id: "9001".to_string(),
        active_handoff_session: None,
        update_offset: 0,
        created_at: now_timestamp(),
    }
}

/// A fresh session with no handoff state.
pub fn test_session(business_id: &str, chat_key: &str) -> Session {
    let now = now_timestamp();
    Session {
        id: SessionId::compose(business_id, chat_key).0,
        business_id: business_id.to_string(),
        chat_key: chat_key.to_string(),
        handoff_status: HandoffStatus::None,
        agent_response_pending: false,
        created_at: now.clone(),
        updated_at: now,
    }
}

/// Open a temporary database seeded with [`test_business`] and
/// [`test_session`]; returns the handle, the tempdir guard, and the
/// seeded session id.
pub async fn seeded_db(business_id: &str, chat_key: &str) -> (Database, tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

    businesses::create_business(&db, &test_business(business_id))
        .await
        .unwrap();
    let session = test_session(business_id, chat_key);
    sessions::create_session(&db, &session).await.unwrap();

    (db, dir, session.id)
}
