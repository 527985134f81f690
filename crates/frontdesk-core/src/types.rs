// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Frontdesk workspace.
//!
//! All lifecycle states are closed enums with exhaustive matching at every
//! consumption site; they serialize to the lowercase strings stored in
//! SQLite and carried on the wire.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation session (`{business_id}:{chat_key}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Builds the canonical session id for a business and client-chosen key.
    pub fn compose(business_id: &str, chat_key: &str) -> Self {
        Self(format!("{business_id}:{chat_key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a message in the conversation log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Handoff state of a session.
///
/// Transitions only along None -> Pending -> Active -> None; the cycle may
/// repeat over a session's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HandoffStatus {
    None,
    Pending,
    Active,
}

/// Resolution state of a single handoff request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HandoffRequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// Review state of an appointment request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Declined,
}

/// A business profile: read-only configuration for one tenant, plus the
/// two mutable bridge fields (tunneled-session pointer and poll cursor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub business_id: String,
    pub name: String,
    /// Pre-built system prompt seeded into every new session.
    pub system_prompt: String,
    /// Free-text operating hours shown to the model.
    pub business_hours: String,
    /// Booking window in `Day-Day start - end` form; empty means unrestricted.
    pub appointment_hours: String,
    pub appointment_enabled: bool,
    /// Telegram bot token for the operator channel. Empty disables the bridge.
    pub bot_token: String,
    /// Pre-registered operator chat id. Only this identity may tunnel replies.
    pub operator_chat_id: String,
    /// Session currently targeted by untargeted operator replies.
    pub active_handoff_session: Option<String>,
    /// Poll cursor: next getUpdates offset for this business's bot.
    pub update_offset: i64,
    pub created_at: String,
}

/// One conversation session, scoped to a business and a client-chosen key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub business_id: String,
    pub chat_key: String,
    pub handoff_status: HandoffStatus,
    /// Set while the user awaits a tunneled operator reply.
    pub agent_response_pending: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One entry in a session's append-only message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

/// A role/text pair as sent to the completion backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A request to route a session to a human operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffRequest {
    pub id: i64,
    pub business_id: String,
    pub session_id: String,
    /// Operator-channel message carrying the accept/decline affordances,
    /// kept for targeted edits.
    pub operator_message_id: Option<i64>,
    pub status: HandoffRequestStatus,
    pub created_at: String,
}

/// An appointment request extracted from model output.
///
/// `preferred_time` is the validated literal string as the customer wrote
/// it; conflict detection compares these strings for exact equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub business_id: String,
    pub chat_key: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_mobile: String,
    pub preferred_time: String,
    pub note: String,
    pub status: AppointmentStatus,
    pub operator_message_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

// --- Operator channel types ---

/// A single button in an operator-channel inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    /// Opaque token delivered back in a button-press event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    /// Pre-fills the operator's input field instead of firing a callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            switch_inline_query_current_chat: None,
        }
    }

    pub fn inline_query(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            switch_inline_query_current_chat: Some(query.into()),
        }
    }
}

/// Rows of inline buttons attached to an outbound operator notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// A keyboard with a single row of buttons.
    pub fn single_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }
}

/// One update delivered by the operator channel, on either path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorUpdate {
    /// Channel-assigned, strictly increasing identifier; dedup key.
    pub update_id: i64,
    pub event: OperatorEvent,
}

/// The payload of an operator-channel update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorEvent {
    /// A button press carrying its opaque callback token.
    Callback {
        /// Callback query id, echoed back when answering.
        id: String,
        data: String,
        /// Message the button was attached to, for targeted edits.
        message_id: Option<i64>,
    },
    /// A plain text message from some chat.
    Text {
        chat_id: String,
        text: String,
        message_id: i64,
    },
}
