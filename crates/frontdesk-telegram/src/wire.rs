// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serde types for the subset of the Telegram Bot API this service uses.

use frontdesk_core::{OperatorEvent, OperatorUpdate};
use serde::Deserialize;

/// Envelope every Bot API method returns.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct WireChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub message_id: i64,
    #[serde(default)]
    pub chat: Option<WireChat>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireCallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WireUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub callback_query: Option<WireCallbackQuery>,
}

impl WireUpdate {
    /// Convert to the domain update type. Updates carrying neither a text
    /// message nor a data-bearing callback (stickers, photos, membership
    /// changes) yield `None` and are dropped by the caller.
    pub fn into_operator_update(self) -> Option<OperatorUpdate> {
        if let Some(callback) = self.callback_query {
            let data = callback.data?;
            return Some(OperatorUpdate {
                update_id: self.update_id,
                event: OperatorEvent::Callback {
                    id: callback.id,
                    data,
                    message_id: callback.message.map(|m| m.message_id),
                },
            });
        }
        let message = self.message?;
        let text = message.text?;
        let chat = message.chat?;
        Some(OperatorUpdate {
            update_id: self.update_id,
            event: OperatorEvent::Text {
                chat_id: chat.id.to_string(),
                text,
                message_id: message.message_id,
            },
        })
    }
}
